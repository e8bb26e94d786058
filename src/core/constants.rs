//! Protocol-level constants for the upstream simulation link

/// Datagram prefix carrying a pointing solution (`AZ:<az> ALT:<alt>`).
pub const POINTING_PREFIX: &str = "AZ";

/// Datagram prefix reporting an upstream domain error.
pub const ERROR_PREFIX: &str = "ERROR";

/// Status text shown while the selected target cannot be observed.
pub const TARGET_NOT_OBSERVABLE: &str = "Target below horizon or not observable";

/// Status text shown before the first telemetry datagram arrives.
pub const WAITING_FOR_TELEMETRY: &str = "Waiting for telemetry";
