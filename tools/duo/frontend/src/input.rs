use bit_field::BitField;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Buttons {
    A,
    B,
    Up,
    Down,
    Left,
    Right,
}

impl Buttons {
    const fn idx(&self) -> usize {
        match self {
            Buttons::A => 6,
            Buttons::B => 4,

            Buttons::Up => 3,
            Buttons::Down => 2,
            Buttons::Left => 1,
            Buttons::Right => 0,
        }
    }

    pub fn mask(buttons: &[Buttons]) -> u8 {
        let mut byte = 0u8;
        for button in buttons {
            byte.set_bit(button.idx(), true);
        }
        byte
    }
}

/// Held/previous button state, fed one byte per frame.
#[derive(Debug, Default)]
pub struct Gamepad {
    buttons: u8,
    buttons_last: u8,
}

impl Gamepad {
    pub fn feed(&mut self, buttons: u8) {
        self.buttons_last = self.buttons;
        self.buttons = buttons;
    }

    #[inline]
    pub fn is_pressed(&self, button: Buttons) -> bool {
        self.buttons.get_bit(button.idx())
    }

    #[inline]
    pub fn was_pressed(&self, button: Buttons) -> bool {
        self.buttons_last.get_bit(button.idx())
    }

    /// True only on the frame the button went down.
    #[inline]
    pub fn just_pressed(&self, button: Buttons) -> bool {
        self.is_pressed(button) && !self.was_pressed(button)
    }
}

/// A canned input sequence: `(frames, buttons held)` segments played in
/// order, then nothing held.
#[derive(Debug, Clone)]
pub struct Script {
    segments: Vec<(u32, u8)>,
    segment: usize,
    elapsed: u32,
}

impl Script {
    pub fn new(segments: Vec<(u32, u8)>) -> Self {
        Self {
            segments,
            segment: 0,
            elapsed: 0,
        }
    }

    /// Flies the ship around the primary screen, drops and respawns it, then
    /// climbs onto the secondary screen and back.
    pub fn tour() -> Self {
        use Buttons::*;
        Self::new(vec![
            (30, Buttons::mask(&[Right])),
            (20, Buttons::mask(&[Up, Left])),
            (5, 0),
            (2, Buttons::mask(&[A])),
            (10, 0),
            (2, Buttons::mask(&[B])),
            (70, Buttons::mask(&[Up])),
            (40, Buttons::mask(&[Right])),
            (60, Buttons::mask(&[Down])),
            (10, Buttons::mask(&[Left])),
        ])
    }

    /// Nobody touches the controls.
    pub fn idle() -> Self {
        Self::new(Vec::new())
    }

    pub fn next_frame(&mut self) -> u8 {
        while let Some(&(frames, buttons)) = self.segments.get(self.segment) {
            if self.elapsed < frames {
                self.elapsed += 1;
                return buttons;
            }
            self.segment += 1;
            self.elapsed = 0;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_are_detected() {
        let mut pad = Gamepad::default();
        pad.feed(Buttons::mask(&[Buttons::A]));
        assert!(pad.just_pressed(Buttons::A));
        pad.feed(Buttons::mask(&[Buttons::A, Buttons::Up]));
        assert!(pad.is_pressed(Buttons::A) && !pad.just_pressed(Buttons::A));
        assert!(pad.just_pressed(Buttons::Up));
    }

    #[test]
    fn script_plays_segments_in_order() {
        let mut script = Script::new(vec![(2, 1), (1, 2)]);
        let frames: Vec<u8> = (0..5).map(|_| script.next_frame()).collect();
        assert_eq!(frames, [1, 1, 2, 0, 0]);
    }
}
