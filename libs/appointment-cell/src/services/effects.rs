// libs/appointment-cell/src/services/effects.rs
use async_trait::async_trait;
use tracing::info;

use crate::models::Effect;

/// Carries out effects after the state change behind them is persisted.
#[async_trait]
pub trait EffectDispatcher: Send + Sync {
    async fn dispatch(&self, effects: &[Effect]);
}

/// Writes audit entries and notification requests to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEffectDispatcher;

#[async_trait]
impl EffectDispatcher for TracingEffectDispatcher {
    async fn dispatch(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::AuditCreated { appointment_id, actor_id } => {
                    info!(target: "audit", appointment_id = %appointment_id, actor = ?actor_id, "appointment created");
                }
                Effect::AuditTransition {
                    appointment_id,
                    from,
                    to,
                    actor_id,
                } => {
                    info!(
                        target: "audit",
                        appointment_id = %appointment_id,
                        from = %from,
                        to = %to,
                        actor = ?actor_id,
                        "appointment state changed"
                    );
                }
                Effect::ScheduleReminder { appointment_id, remind_at } => {
                    info!(target: "notifications", appointment_id = %appointment_id, remind_at = %remind_at, "reminder scheduled");
                }
                other => {
                    info!(target: "notifications", effect = ?other, "notification queued");
                }
            }
        }
    }
}
