//! UI domain: panel state, chest transfers, and the toast feed. Nothing is
//! drawn here; a render layer reads `UiPanels` and `ToastFeed`.

mod chest_screen;
mod panels;
mod toast;

use bevy::prelude::*;

use crate::shared::*;
use crate::world::notify::flush_notifications;
use crate::world::SimParams;

pub use chest_screen::{close_chest, close_unreachable_chest, open_chest, transfer};
pub use panels::{apply_ui_action, close_all, toggle_inventory, toggle_wallet};
pub use toast::{ActiveToast, ToastFeed};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiPanels>()
            .init_resource::<ToastFeed>()
            .add_systems(
                Update,
                (handle_ui_actions, handle_chest_transfers)
                    .chain()
                    .in_set(TickSet::Input),
            )
            .add_systems(Update, close_distant_chest.in_set(TickSet::Focus))
            .add_systems(
                Update,
                (toast::handle_toast_events, toast::update_toasts)
                    .chain()
                    .after(flush_notifications)
                    .in_set(TickSet::Notify),
            );
    }
}

pub fn handle_ui_actions(mut events: EventReader<UiActionEvent>, mut params: SimParams) {
    for action in events.read() {
        apply_ui_action(&mut params.sim(), *action);
    }
}

pub fn handle_chest_transfers(mut events: EventReader<ChestTransferEvent>, mut params: SimParams) {
    for event in events.read() {
        transfer(&mut params.sim(), &event.id, event.direction);
    }
}

pub fn close_distant_chest(mut params: SimParams) {
    close_unreachable_chest(&mut params.sim());
}
