pub mod documentdtos;
pub mod propertydtos;
pub mod tokenizationdtos;
