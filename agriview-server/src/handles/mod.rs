mod advisor_handle;
mod farm_handle;
mod panel_handle;
mod rule_handle;
mod setting_handle;
mod sse_handle;

pub use advisor_handle::*;
pub use farm_handle::*;
pub use panel_handle::*;
pub use rule_handle::*;
pub use setting_handle::*;
pub use sse_handle::*;
