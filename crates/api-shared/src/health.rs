use crate::dto::HealthRes;

/// Health check shared by the API crates.
pub struct HealthService;

impl HealthService {
    /// Report that the service is up.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Staffing sheet service is alive".into(),
        }
    }
}
