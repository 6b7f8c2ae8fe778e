//! DTOs del endpoint de administración de settings

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

// Update parcial: solo los campos presentes se modifican
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub terminal_fee: Option<Decimal>,
    pub min_deposit_amount: Option<Decimal>,

    #[validate(range(min = 0, max = 1440))]
    pub entry_cooldown_minutes: Option<i32>,

    #[validate(range(min = 1, max = 1440))]
    pub departure_duration_minutes: Option<i32>,

    #[validate(range(min = 5, max = 3600))]
    pub countdown_duration_seconds: Option<i32>,

    #[validate(range(min = 5, max = 600))]
    pub queue_refresh_interval_seconds: Option<i32>,
}
