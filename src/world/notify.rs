//! Turns the queued `Notification`s into Bevy events once per tick.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::shared::*;

#[derive(SystemParam)]
pub struct Notifier<'w> {
    ping: EventWriter<'w, PingEvent>,
    toast: EventWriter<'w, ToastEvent>,
    inventory: EventWriter<'w, InventoryChangedEvent>,
    wallet: EventWriter<'w, WalletChangedEvent>,
    craft: EventWriter<'w, CraftChangedEvent>,
    chest_open: EventWriter<'w, ChestOpenEvent>,
    chest_close: EventWriter<'w, ChestCloseEvent>,
    chest_changed: EventWriter<'w, ChestChangedEvent>,
    hunger: EventWriter<'w, HungerChangedEvent>,
    effects: EventWriter<'w, EffectsChangedEvent>,
    fatigue: EventWriter<'w, StaminaFatigueEvent>,
    panel: EventWriter<'w, PanelToggledEvent>,
}

impl Notifier<'_> {
    pub fn send(&mut self, note: Notification) {
        match note {
            Notification::Ping(message) => {
                self.ping.send(PingEvent { message });
            }
            Notification::Toast(message) => {
                self.toast.send(ToastEvent {
                    message,
                    duration_secs: TOAST_SECS,
                });
            }
            Notification::InventoryChanged => {
                self.inventory.send(InventoryChangedEvent);
            }
            Notification::WalletChanged => {
                self.wallet.send(WalletChangedEvent);
            }
            Notification::CraftChanged => {
                self.craft.send(CraftChangedEvent);
            }
            Notification::ChestOpen(chest) => {
                self.chest_open.send(ChestOpenEvent { chest });
            }
            Notification::ChestClose => {
                self.chest_close.send(ChestCloseEvent);
            }
            Notification::ChestChanged(chest) => {
                self.chest_changed.send(ChestChangedEvent { chest });
            }
            Notification::HungerChanged(state) => {
                self.hunger.send(HungerChangedEvent { state });
            }
            Notification::EffectsChanged(effects) => {
                self.effects.send(EffectsChangedEvent { effects });
            }
            Notification::StaminaFatigue(FatigueState { active, remaining_ms }) => {
                self.fatigue.send(StaminaFatigueEvent { active, remaining_ms });
            }
            Notification::PanelToggled { panel, open } => {
                self.panel.send(PanelToggledEvent { panel, open });
            }
        }
    }
}

pub fn flush_notifications(mut outbox: ResMut<Outbox>, mut notifier: Notifier) {
    for note in outbox.drain() {
        if let Notification::Toast(message) = &note {
            debug!("[Notify] toast: {message}");
        }
        notifier.send(note);
    }
}
