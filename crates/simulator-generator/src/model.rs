//! The six record models the simulator knows how to generate.

use crate::generator::GeneratorError;
use serde::{Deserialize, Serialize};

/// Domain model a simulation run is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    Driver,
    Vehicle,
    Client,
    Location,
    Product,
    Delivery,
}

impl Model {
    /// Every model, in display order.
    pub const ALL: [Model; 6] = [
        Model::Driver,
        Model::Vehicle,
        Model::Client,
        Model::Location,
        Model::Product,
        Model::Delivery,
    ];

    /// Collection the model writes to unless overridden.
    pub fn default_collection(&self) -> &'static str {
        match self {
            Model::Driver => "DriverCollection",
            Model::Vehicle => "VehicleCollection",
            Model::Client => "ClientCollection",
            Model::Location => "LocationCollection",
            Model::Product => "ProductCollection",
            Model::Delivery => "DeliveryCollection",
        }
    }

    /// Name of the task that simulates this model, as shown by run listings.
    pub fn task_name(&self) -> String {
        format!("simulate_{self}_data")
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Model::Driver => write!(f, "driver"),
            Model::Vehicle => write!(f, "vehicle"),
            Model::Client => write!(f, "client"),
            Model::Location => write!(f, "location"),
            Model::Product => write!(f, "product"),
            Model::Delivery => write!(f, "delivery"),
        }
    }
}

impl std::str::FromStr for Model {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driver" => Ok(Model::Driver),
            "vehicle" => Ok(Model::Vehicle),
            "client" => Ok(Model::Client),
            "location" => Ok(Model::Location),
            "product" => Ok(Model::Product),
            "delivery" => Ok(Model::Delivery),
            _ => Err(GeneratorError::UnknownModel(s.to_string())),
        }
    }
}
