mod advisor_service;
mod automation_service;
mod automation_switch;
mod control_panel;
mod event_bus;
mod reconciliation;
mod remote_channel;
mod rule_evaluator;
mod rule_store;

pub use advisor_service::*;
pub use automation_service::*;
pub use automation_switch::*;
pub use control_panel::*;
pub use event_bus::*;
pub use reconciliation::*;
pub use remote_channel::*;
pub use rule_evaluator::*;
pub use rule_store::*;
