//! Embedded in-memory store.
//!
//! Backs the service in tests and single-node deployments; evaluates
//! matchers directly against the typed records.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::{Institution, Organizer, SeminarSeries, Talk};

use super::{Query, Store};

/// Seed payload for populating a [`MemoryStore`] from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub institutions: Vec<Institution>,
    #[serde(default)]
    pub seminars: Vec<SeminarSeries>,
    #[serde(default)]
    pub organizers: Vec<Organizer>,
    #[serde(default)]
    pub talks: Vec<Talk>,
}

/// In-memory store over `tokio` read-write locks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    talks: RwLock<Vec<Talk>>,
    seminars: RwLock<HashMap<String, SeminarSeries>>,
    organizers: RwLock<Vec<Organizer>>,
    institutions: RwLock<HashMap<String, Institution>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a seed payload.
    pub async fn from_seed(seed: SeedData) -> Self {
        let store = Self::new();
        for institution in seed.institutions {
            store.insert_institution(institution).await;
        }
        for seminar in seed.seminars {
            store.insert_seminar(seminar).await;
        }
        for organizer in seed.organizers {
            store.insert_organizer(organizer).await;
        }
        for talk in seed.talks {
            store.insert_talk(talk).await;
        }
        store
    }

    /// Parse a JSON seed document and build a store from it.
    pub async fn from_seed_json(json: &str) -> Result<Self> {
        let seed: SeedData = serde_json::from_str(json)?;
        Ok(Self::from_seed(seed).await)
    }

    pub async fn insert_talk(&self, talk: Talk) {
        self.talks.write().await.push(talk);
    }

    pub async fn insert_seminar(&self, seminar: SeminarSeries) {
        self.seminars
            .write()
            .await
            .insert(seminar.shortname.clone(), seminar);
    }

    pub async fn insert_organizer(&self, organizer: Organizer) {
        self.organizers.write().await.push(organizer);
    }

    pub async fn insert_institution(&self, institution: Institution) {
        self.institutions
            .write()
            .await
            .insert(institution.shortname.clone(), institution);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn search_talks(&self, query: &Query) -> Result<Vec<Talk>> {
        let talks = self.talks.read().await;
        Ok(talks.iter().filter(|t| query.matches(*t)).cloned().collect())
    }

    async fn search_seminars(&self, query: &Query) -> Result<Vec<SeminarSeries>> {
        let seminars = self.seminars.read().await;
        let mut matched: Vec<SeminarSeries> = seminars
            .values()
            .filter(|s| query.matches(*s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.shortname.cmp(&b.shortname));
        Ok(matched)
    }

    async fn seminar_shortnames(&self, query: &Query) -> Result<Vec<String>> {
        let seminars = self.seminars.read().await;
        let mut names: Vec<String> = seminars
            .values()
            .filter(|s| query.matches(*s))
            .map(|s| s.shortname.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn all_seminars(&self) -> Result<HashMap<String, SeminarSeries>> {
        Ok(self.seminars.read().await.clone())
    }

    async fn organizer_lookup(&self, query: &Query) -> Result<HashMap<String, Vec<Organizer>>> {
        let organizers = self.organizers.read().await;
        let mut lookup: HashMap<String, Vec<Organizer>> = HashMap::new();
        for organizer in organizers.iter().filter(|o| query.matches(*o)) {
            lookup
                .entry(organizer.seminar_id.clone())
                .or_default()
                .push(organizer.clone());
        }
        for members in lookup.values_mut() {
            members.sort_by_key(|o| o.order);
        }
        Ok(lookup)
    }

    async fn get_seminar(&self, shortname: &str) -> Result<Option<SeminarSeries>> {
        Ok(self.seminars.read().await.get(shortname).cloned())
    }

    async fn get_talk(&self, seminar_id: &str, seminar_ctr: u32) -> Result<Option<Talk>> {
        let talks = self.talks.read().await;
        Ok(talks
            .iter()
            .find(|t| t.seminar_id == seminar_id && t.seminar_ctr == seminar_ctr)
            .cloned())
    }

    async fn talks_for_seminar(&self, shortname: &str) -> Result<Vec<Talk>> {
        let talks = self.talks.read().await;
        Ok(talks
            .iter()
            .filter(|t| t.seminar_id == shortname)
            .cloned()
            .collect())
    }

    async fn get_institution(&self, shortname: &str) -> Result<Option<Institution>> {
        Ok(self.institutions.read().await.get(shortname).cloned())
    }

    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        let institutions = self.institutions.read().await;
        let mut all: Vec<Institution> = institutions.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn distinct_talk_languages(&self) -> Result<Vec<String>> {
        let talks = self.talks.read().await;
        let codes: BTreeSet<String> = talks.iter().map(|t| t.language.clone()).collect();
        Ok(codes.into_iter().collect())
    }
}
