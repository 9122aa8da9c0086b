use std::sync::LazyLock;

pub const A4_FREQUENCY: f64 = 440.0;
pub const KEY_COUNT: usize = 88;

/// Key names A0..C8, flats for the black keys. Clip files use these names.
const NOTE_NAMES: [&str; KEY_COUNT] = [
    "A0", "Bb0", "B0", "C1", "Db1", "D1", "Eb1", "E1", "F1", "Gb1", "G1", "Ab1",
    "A1", "Bb1", "B1", "C2", "Db2", "D2", "Eb2", "E2", "F2", "Gb2", "G2", "Ab2",
    "A2", "Bb2", "B2", "C3", "Db3", "D3", "Eb3", "E3", "F3", "Gb3", "G3", "Ab3",
    "A3", "Bb3", "B3", "C4", "Db4", "D4", "Eb4", "E4", "F4", "Gb4", "G4", "Ab4",
    "A4", "Bb4", "B4", "C5", "Db5", "D5", "Eb5", "E5", "F5", "Gb5", "G5", "Ab5",
    "A5", "Bb5", "B5", "C6", "Db6", "D6", "Eb6", "E6", "F6", "Gb6", "G6", "Ab6",
    "A6", "Bb6", "B6", "C7", "Db7", "D7", "Eb7", "E7", "F7", "Gb7", "G7", "Ab7",
    "A7", "Bb7", "B7", "C8",
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PianoNote {
    /// 1-based key number, A0 = 1, A4 = 49
    pub key: u8,
    pub name: &'static str,
    pub frequency: f64,
}

/// Result of snapping an arbitrary frequency onto the keyboard
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteMatch {
    pub name: &'static str,
    pub frequency: f64,
    pub index: usize,
}

/// The 88 equal-tempered keys, ascending by frequency.
pub struct PianoNoteTable {
    notes: [PianoNote; KEY_COUNT],
}

static STANDARD: LazyLock<PianoNoteTable> = LazyLock::new(PianoNoteTable::build);

impl PianoNoteTable {
    pub fn standard() -> &'static PianoNoteTable {
        &STANDARD
    }

    fn build() -> Self {
        let notes = std::array::from_fn(|i| {
            let key = i as i32 + 1;
            PianoNote {
                key: key as u8,
                name: NOTE_NAMES[i],
                frequency: A4_FREQUENCY * 2f64.powf((key - 49) as f64 / 12.0),
            }
        });
        Self { notes }
    }

    pub fn notes(&self) -> &[PianoNote] {
        &self.notes
    }

    #[cfg(test)]
    fn by_name(&self, name: &str) -> Option<&PianoNote> {
        self.notes.iter().find(|n| n.name == name)
    }

    /// Key with the smallest absolute distance to `frequency`. Scanning is
    /// ascending and only a strictly smaller distance replaces the current
    /// best, so an exact tie resolves to the lower key.
    pub fn closest(&self, frequency: f64) -> NoteMatch {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, note) in self.notes.iter().enumerate() {
            let distance = (note.frequency - frequency).abs();
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        let note = &self.notes[best];
        NoteMatch {
            name: note.name,
            frequency: note.frequency,
            index: best,
        }
    }
}
