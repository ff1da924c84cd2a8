pub mod salary;
pub mod time;
pub mod validation;
