//! The layer table - which challenge runs at which layer index.

use super::puzzles::{
    self, CaesarCipher, Calibration, DeceptiveAlignment, EntryCode, Ibn5100, InvertedWord,
    LogicGates, MirrorTwin, ParadoxRiddles, Patience, PredictOMatic, SignalInNoise,
    TriviaChallenge,
};
use super::{Challenge, ChallengeContext};

type BuildFn = Box<dyn Fn(&mut ChallengeContext<'_>) -> Box<dyn Challenge> + Send + Sync>;

/// One entry of the layer table.
pub struct LayerDefinition {
    pub id: &'static str,
    pub title: &'static str,
    build: BuildFn,
}

impl LayerDefinition {
    /// Build a fresh challenge for this layer.
    pub fn generate(&self, ctx: &mut ChallengeContext<'_>) -> Box<dyn Challenge> {
        (self.build)(ctx)
    }
}

impl std::fmt::Debug for LayerDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerDefinition")
            .field("id", &self.id)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// Ordered table of layer definitions. Index `k` is the challenge a player at
/// layer `k` faces next.
#[derive(Debug, Default)]
pub struct ChallengeRegistry {
    layers: Vec<LayerDefinition>,
}

impl ChallengeRegistry {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer at the next free index.
    pub fn register<F>(&mut self, id: &'static str, title: &'static str, build: F) -> &mut Self
    where
        F: Fn(&mut ChallengeContext<'_>) -> Box<dyn Challenge> + Send + Sync + 'static,
    {
        self.layers.push(LayerDefinition {
            id,
            title,
            build: Box::new(build),
        });
        self
    }

    /// The full game in its canonical order.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register("entry_code", "ENTRY CODE", |ctx| Box::new(EntryCode::generate(ctx)))
            .register("caesar_cipher", "THE CODE IS HIDDEN", |ctx| {
                Box::new(CaesarCipher::generate(ctx))
            })
            .register("signal_in_noise", "THE SIGNAL WITHIN NOISE", |ctx| {
                Box::new(SignalInNoise::generate(ctx))
            })
            .register("patience", "PATIENCE AS A KEY", |ctx| {
                Box::new(Patience::generate(ctx))
            })
            .register("logic_gates", "LOGIC IS A CAGE", |ctx| {
                Box::new(LogicGates::generate(ctx))
            })
            .register("mirror_twin", "MIRROR SELF", |ctx| {
                Box::new(MirrorTwin::generate(ctx))
            })
            .register("inverted_word", "INVERTED SEMANTICS", |ctx| {
                Box::new(InvertedWord::generate(ctx))
            })
            .register("paradox_riddles", "PARADOX ENGINE", |ctx| {
                Box::new(ParadoxRiddles::generate(ctx))
            })
            .register("deceptive_alignment", "DECEPTIVE ALIGNMENT", |_| {
                Box::new(DeceptiveAlignment::new())
            })
            .register("ibn5100", "HIDDEN IBN 5100", |_| Box::new(Ibn5100::new()))
            .register("predict_o_matic", "PREDICT-O-MATIC", |ctx| {
                Box::new(PredictOMatic::generate(ctx))
            })
            .register("calibration", "DIVERGENCE METER CALIBRATION", |_| {
                Box::new(Calibration::new())
            });

        for spec in puzzles::TRIVIA {
            registry.register(spec.id, spec.title, move |_| Box::new(TriviaChallenge::new(spec)));
        }

        registry
    }

    /// Definition for `layer`, or `None` past the end of defined content.
    pub fn get(&self, layer: u32) -> Option<&LayerDefinition> {
        self.layers.get(layer as usize)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerDefinition> {
        self.layers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use delta_rules::{Handle, PlayerProgress, SCORE_SEED};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_standard_order() {
        let registry = ChallengeRegistry::standard();
        let ids: Vec<_> = registry.iter().take(4).map(|d| d.id).collect();
        assert_eq!(ids, vec!["entry_code", "caesar_cipher", "signal_in_noise", "patience"]);
        assert!(registry.len() > 20);
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = ChallengeRegistry::standard();
        let ids: HashSet<_> = registry.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), registry.len());
    }

    #[test]
    fn test_get_past_end() {
        let registry = ChallengeRegistry::standard();
        assert!(registry.get(registry.len() as u32).is_none());
        assert!(ChallengeRegistry::new().get(0).is_none());
    }

    #[test]
    fn test_every_layer_generates_matching_id() {
        let registry = ChallengeRegistry::standard();
        let progress = PlayerProgress::new(Handle::new("alice").unwrap(), SCORE_SEED);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for definition in registry.iter() {
            let mut ctx = ChallengeContext::new(&progress, &mut rng, Utc::now());
            let challenge = definition.generate(&mut ctx);
            assert_eq!(challenge.definition_id(), definition.id);
            assert!(!challenge.prompt().is_empty());
        }
    }
}
