//! Player domain: the `Player` resource, movement intent and hand
//! selection. Movement itself is stepped by the world tick.

use bevy::prelude::*;

use crate::config::GameBalance;
use crate::shared::*;
use crate::world::handle_clicks;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        let tuning = app
            .world()
            .get_resource::<GameBalance>()
            .map(|b| b.world.clone())
            .unwrap_or_default();

        app.insert_resource(Player {
            pos: tuning.bounds().center(),
            radius: tuning.player_radius,
            speed: tuning.player_speed,
            ..default()
        })
        .add_systems(
            Update,
            (apply_move_input, select_hand)
                .before(handle_clicks)
                .in_set(TickSet::Input),
        );
    }
}

/// Latest movement request wins. No event this frame means the intent
/// from the previous frame is kept.
pub fn apply_move_input(mut events: EventReader<MoveInputEvent>, mut player: ResMut<Player>) {
    if let Some(input) = events.read().last() {
        player.intent = MoveIntent {
            dx: input.dx,
            dy: input.dy,
            sprint: input.sprint,
        };
    }
}

pub fn select_hand(
    mut events: EventReader<SelectHandEvent>,
    mut player: ResMut<Player>,
    inventory: Res<PlayerInventory>,
) {
    for event in events.read() {
        choose_hand(&mut player, &inventory, event.id.as_deref());
    }
}

/// Hold `id`, or empty the hand with `None`. Items the player does not
/// carry cannot be held.
pub fn choose_hand(player: &mut Player, inventory: &Inventory, id: Option<&str>) -> bool {
    match id {
        Some(id) if !inventory.has(id, 1) => {
            debug!("[Player] cannot hold {id}: not carried");
            false
        }
        Some(id) => {
            player.hand = Some(id.to_string());
            true
        }
        None => {
            player.hand = None;
            true
        }
    }
}
