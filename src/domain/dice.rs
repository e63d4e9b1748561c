use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shared source of uniform draws. Seeding it makes every outcome reproducible.
#[derive(Clone, Debug)]
pub struct Dice {
    rng: Arc<Mutex<StdRng>>,
}

impl Dice {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Dice {
            rng: Arc::new(Mutex::new(rng)),
        }
    }

    /// Uniform in [0, 1).
    pub fn unit(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen::<f64>()
    }

    pub fn index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..len.max(1))
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::new(None)
    }
}
