//! Column names of the raw HC export, the reference workbook and the output.

// Raw export
pub const EMPLOYEE_ID: &str = "Employee ID";
pub const EMPLOYEE_NAME: &str = "Employee Name";

// Shared by the raw export, the mapping sheet and the output
pub const BUSINESS_LEVEL_6_DESC: &str = "Business Level 6 Desc";
pub const MT_ROLLUP_HIERARCHY_1: &str = "MT Rollup Hierarchy 1 Name";
pub const MT_ROLLUP_HIERARCHY_2: &str = "MT Rollup Hierarchy 2 Name";
pub const COUNTRY: &str = "Country";
pub const EMPLOYMENT_TYPE: &str = "Employment Type";
pub const GLOBAL_BUSINESS_FUNCTION: &str = "Global Business Function";

// Mapping sheet values
pub const MT_DOMAIN: &str = "MT Domain";
pub const GENERIC_DEPT: &str = "Generic Dept (roll up)";

// Existing sheet (and output)
pub const BANK_ID: &str = "Bank ID";
pub const JUSTIFICATION: &str = "Justification";

// Output only
pub const NAME: &str = "Name";
pub const START_DATE: &str = "Start Date";
pub const END_DATE: &str = "End Date";
