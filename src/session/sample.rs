use crate::audio::SampleId;
use crate::error::{LoopttyError, Result};
use crate::shared::{clamp_volume, MAX_VOLUME};

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub id: SampleId,
    pub name: String,
    pub category: String,
    pub duration_secs: f32,
    pub volume: f32,
}

// Append-only: samples can leave tracks, never the registry
#[derive(Clone, Debug, Default)]
pub struct SampleRegistry {
    samples: Vec<Sample>,
}

impl SampleRegistry {
    pub fn register(
        &mut self,
        id: SampleId,
        name: impl Into<String>,
        category: impl Into<String>,
        duration_secs: f32,
    ) {
        self.samples.push(Sample {
            id,
            name: name.into(),
            category: category.into(),
            duration_secs,
            volume: MAX_VOLUME,
        });
    }

    pub fn get(&self, id: SampleId) -> Option<&Sample> {
        self.samples.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: SampleId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    // distinct, first-seen order
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for s in &self.samples {
            if !out.contains(&s.category) {
                out.push(s.category.clone());
            }
        }
        out
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Sample> + 'a {
        self.samples.iter().filter(move |s| s.category == category)
    }

    pub fn set_volume(&mut self, id: SampleId, volume: f32) -> Result<f32> {
        let sample = self
            .samples
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(LoopttyError::SampleNotFound(id))?;
        sample.volume = clamp_volume(volume);
        Ok(sample.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SampleRegistry {
        let mut reg = SampleRegistry::default();
        reg.register(SampleId(1), "Bass", "Basses", 1.5);
        reg.register(SampleId(2), "Piano", "Strings", 2.0);
        reg.register(SampleId(3), "Violin", "Strings", 3.0);
        reg
    }

    #[test]
    fn categories_keep_first_seen_order() {
        assert_eq!(registry().categories(), vec!["Basses", "Strings"]);
    }

    #[test]
    fn category_filter() {
        let reg = registry();
        let names: Vec<&str> = reg.in_category("Strings").map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Piano", "Violin"]);
        assert_eq!(reg.in_category("Drums").count(), 0);
    }

    #[test]
    fn volume_is_clamped_to_slider_range() {
        let mut reg = registry();
        assert_eq!(reg.set_volume(SampleId(1), 0.3).unwrap(), 0.3);
        assert_eq!(reg.set_volume(SampleId(1), 1.7).unwrap(), 1.0);
        assert_eq!(reg.set_volume(SampleId(1), -0.2).unwrap(), 0.0);
        assert_eq!(reg.get(SampleId(1)).unwrap().volume, 0.0);
        assert!(reg.set_volume(SampleId(9), 0.5).is_err());
    }
}
