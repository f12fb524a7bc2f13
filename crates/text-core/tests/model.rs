use rand_chacha::rand_core::{RngCore, SeedableRng};
use text_core::{Text, TextOptions};

/// Flat reference: one full copy of the content per revision.
struct Model {
    content: Vec<u8>,
    revisions: Vec<Vec<u8>>,
    current: usize,
    pending: bool,
}

impl Model {
    fn new() -> Self {
        Self {
            content: Vec::new(),
            revisions: vec![Vec::new()],
            current: 0,
            pending: false,
        }
    }

    fn edited(&mut self) {
        if !self.pending {
            self.revisions.truncate(self.current + 1);
            self.revisions.push(Vec::new());
            self.current += 1;
            self.pending = true;
        }

        self.revisions[self.current] = self.content.clone();
    }

    fn undo(&mut self) -> bool {
        self.pending = false;

        if self.current == 0 {
            return false;
        }

        self.current -= 1;
        self.content = self.revisions[self.current].clone();
        true
    }

    fn redo(&mut self) -> bool {
        self.pending = false;

        if self.current + 1 == self.revisions.len() {
            return false;
        }

        self.current += 1;
        self.content = self.revisions[self.current].clone();
        true
    }
}

fn random_bytes(rng: &mut impl RngCore) -> Vec<u8> {
    let len = 1 + rng.next_u32() as usize % 8;

    (0..len).map(|_| b'a' + (rng.next_u32() % 26) as u8).collect()
}

fn run(seed: u64, options: TextOptions) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
    let mut text = Text::load_with(None::<&str>, options).unwrap();
    let mut model = Model::new();

    for round in 0..2_000 {
        let size = model.content.len();

        match rng.next_u32() % 10 {
            0..=3 => {
                let pos = rng.next_u32() as usize % (size + 2);
                let bytes = random_bytes(&mut rng);
                let res = text.insert(pos, &bytes);

                if pos > size {
                    assert!(res.is_err(), "round {round}: insert past end accepted");
                } else {
                    res.unwrap();
                    model.content.splice(pos..pos, bytes);
                    model.edited();
                }
            }
            4..=6 => {
                let pos = rng.next_u32() as usize % (size + 2);
                let len = 1 + rng.next_u32() as usize % 6;
                let res = text.delete(pos, len);

                if pos + len > size {
                    assert!(res.is_err(), "round {round}: delete past end accepted");
                } else {
                    res.unwrap();
                    model.content.drain(pos..pos + len);
                    model.edited();
                }
            }
            7 => {
                text.snapshot();
                model.pending = false;
            }
            8 => assert_eq!(text.undo().is_some(), model.undo(), "round {round}: undo"),
            _ => assert_eq!(text.redo().is_some(), model.redo(), "round {round}: redo"),
        }

        assert_eq!(text.size(), model.content.len(), "round {round}: size");
        assert_eq!(text.content(), model.content, "round {round}: content");
    }

    let mut it = text.iterator_at(0);
    let mut forward = Vec::new();

    while it.pos() < text.size() {
        forward.push(it.get().unwrap());
        it.next();
    }

    assert_eq!(forward, model.content);
}

#[test]
fn matches_flat_model() {
    for seed in [1, 67_319, 4_242] {
        run(seed, TextOptions::default());
    }
}

#[test]
fn matches_flat_model_without_coalescing() {
    for seed in [7, 99] {
        run(
            seed,
            TextOptions {
                coalesce: false,
                ..TextOptions::default()
            },
        );
    }
}

#[test]
fn marks_obey_shift_law() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1_337);
    let mut text = Text::new();

    text.insert(0, b"the quick brown fox jumps over the lazy dog").unwrap();

    let mut marks: Vec<_> = (0..=text.size())
        .step_by(3)
        .map(|pos| (text.mark_set(pos), Some(pos)))
        .collect();

    for round in 0..500 {
        let size = text.size();

        if rng.next_u32() % 2 == 0 || size < 4 {
            let pos = rng.next_u32() as usize % (size + 1);
            let bytes = random_bytes(&mut rng);

            text.insert(pos, &bytes).unwrap();

            for (_, expected) in &mut marks {
                if let Some(m) = expected
                    && *m >= pos
                {
                    *m += bytes.len();
                }
            }
        } else {
            let pos = rng.next_u32() as usize % size;
            let len = 1 + rng.next_u32() as usize % (size - pos).min(4);

            text.delete(pos, len).unwrap();

            for (_, expected) in &mut marks {
                *expected = match *expected {
                    Some(m) if m >= pos + len => Some(m - len),
                    Some(m) if m >= pos => None,
                    other => other,
                };
            }
        }

        if rng.next_u32() % 5 == 0 {
            text.snapshot();
        }

        for (mark, expected) in &marks {
            assert_eq!(text.mark_get(*mark), *expected, "round {round}: {mark:?}");
        }
    }
}
