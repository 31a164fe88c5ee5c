use crate::device::{DeviceKind, JoypadButton, StateStore};

/// Buttons whose stored value is non-zero, in id order. Level-triggered: a
/// button held for ten frames is reported ten times.
pub fn held_buttons(store: &StateStore) -> Vec<JoypadButton> {
    let slot = store.slot(DeviceKind::Joypad);
    slot.descriptor()
        .ids
        .iter()
        .filter(|id| slot.read(0, 0, *id) != 0)
        .filter_map(JoypadButton::from_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_every_held_button_in_id_order() {
        let mut store = StateStore::allocate();
        let pad = &mut store.slots_mut()[0];
        pad.write(0, 0, JoypadButton::A.id(), 1);
        pad.write(0, 0, JoypadButton::Up.id(), 1);

        assert_eq!(
            held_buttons(&store),
            vec![JoypadButton::Up, JoypadButton::A]
        );
        // Still held next frame without any change.
        assert_eq!(held_buttons(&store).len(), 2);
    }

    #[test]
    fn nothing_held_on_fresh_store() {
        assert!(held_buttons(&StateStore::allocate()).is_empty());
    }
}
