// Library interface for pitwall
// This allows integration tests to access internal modules

pub mod analysis;
pub mod config;
pub mod errors;
pub mod export;
pub mod request;
pub mod session;
pub mod stats;

// Re-export commonly used types
pub use config::{AnalysisConfig, AppConfig};
pub use errors::PitwallError;
pub use request::{ChartData, ChartKind, ChartRequest, build_chart};
pub use session::{FileSessionProvider, Session, SessionKey, SessionProvider};
