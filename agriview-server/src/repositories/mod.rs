mod actuator_log;
mod preference;

pub use actuator_log::ActuatorLogRepository;
pub use preference::PreferenceRepository;
