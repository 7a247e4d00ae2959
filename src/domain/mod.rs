// Domain layer - Restock forecast data and pure derivations
pub mod adjustment;
pub mod alert;
pub mod chart;
pub mod prediction;
pub mod price;
pub mod stock;
