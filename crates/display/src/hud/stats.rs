/// What the host reports about its loaded world for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldSample {
    pub player_count: usize,
    /// Progress towards the next level in `[0, 1]`, absent without a local
    /// player.
    pub experience_progress: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerStats {
    player_count: usize,
    experience_percent: u8,
}

impl PlayerStats {
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn experience_percent(&self) -> u8 {
        self.experience_percent
    }

    /// Updates from this tick's world. Without a world both values drop to
    /// zero; a world without a local player keeps the last experience value.
    pub fn sample(&mut self, world: Option<&WorldSample>) {
        let Some(world) = world else {
            *self = Self::default();
            return;
        };

        self.player_count = world.player_count;
        if let Some(progress) = world.experience_progress {
            self.experience_percent = experience_percent(progress);
        }
    }
}

fn experience_percent(progress: f32) -> u8 {
    if !progress.is_finite() {
        return 0;
    }
    (progress * 100.0).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_world_zeroes() {
        let mut stats = PlayerStats::default();
        stats.sample(Some(&WorldSample {
            player_count: 4,
            experience_progress: Some(0.5),
        }));
        assert_eq!(stats.player_count(), 4);
        assert_eq!(stats.experience_percent(), 50);

        stats.sample(None);
        assert_eq!(stats, PlayerStats::default());
    }

    #[test]
    fn test_missing_player_keeps_experience() {
        let mut stats = PlayerStats::default();
        stats.sample(Some(&WorldSample {
            player_count: 2,
            experience_progress: Some(0.259),
        }));
        assert_eq!(stats.experience_percent(), 25);

        stats.sample(Some(&WorldSample {
            player_count: 3,
            experience_progress: None,
        }));
        assert_eq!(stats.player_count(), 3);
        assert_eq!(stats.experience_percent(), 25);
    }

    #[test]
    fn test_experience_clamped() {
        assert_eq!(experience_percent(1.7), 100);
        assert_eq!(experience_percent(-0.2), 0);
        assert_eq!(experience_percent(f32::NAN), 0);
        assert_eq!(experience_percent(0.999), 99);
    }
}
