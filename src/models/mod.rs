pub mod documentmodel;
pub mod propertymodel;
pub mod tokenizationmodel;
