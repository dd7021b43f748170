pub mod constants;
pub mod crc;
pub mod device;
pub mod error;
pub mod packet;
pub mod reading;
pub mod transport;


// Re-export the SensorLink struct for easy access
pub use device::{LinkState, LinkTiming, SensorLink};
pub use error::SensorError;
pub use reading::Reading;
pub use transport::{Connector, PortSettings, SerialConnector, Transport};
