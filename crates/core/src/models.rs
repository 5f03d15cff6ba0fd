//! Payload shapes served under `/api/*`.
//!
//! Every collection is a JSON array of flat records with camelCase field
//! names. Optional fields accept either `null` or absence.

use crate::{Error, ResourceKey};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A record type served as a whole collection at `/api/<RESOURCE>`.
pub trait Collection: DeserializeOwned + Send + 'static {
    const RESOURCE: &'static str;

    fn key() -> Result<ResourceKey, Error> {
        ResourceKey::api(Self::RESOURCE)
    }
}

/// Ids are strings in the static JSON files but numbers from the dev server.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub published_at: String,
    pub author: Option<String>,
    pub featured: Option<bool>,
}

impl Collection for NewsArticle {
    const RESOURCE: &'static str = "news";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub registration_url: Option<String>,
}

impl Collection for Event {
    const RESOURCE: &'static str = "events";
}

/// Student, faculty or alumni spotlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub title: String,
    pub profile_type: Option<String>,
    pub department: Option<String>,
    pub bio: Option<String>,
    pub quote: Option<String>,
    pub image_url: Option<String>,
    pub email: Option<String>,
}

impl Collection for Profile {
    const RESOURCE: &'static str = "profiles";
}

/// Editable copy block for a page section (hero, intro, callouts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub page: String,
    pub section: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub order: Option<i32>,
}

impl Collection for ContentSection {
    const RESOURCE: &'static str = "content";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerCategory {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub partners: Vec<Partner>,
}

impl Collection for PartnerCategory {
    const RESOURCE: &'static str = "partners";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPath {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub icon: Option<String>,
}

impl Collection for EducationPath {
    const RESOURCE: &'static str = "education-paths";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub dean: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub programs: Vec<String>,
}

impl Collection for School {
    const RESOURCE: &'static str = "schools";
}

/// Headline figure shown with a count-up animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchStat {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub label: String,
    pub value: u64,
    pub suffix: Option<String>,
    pub description: Option<String>,
}

impl Collection for ResearchStat {
    const RESOURCE: &'static str = "research-stats";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadershipMember {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub position: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub order: Option<i32>,
}

impl Collection for LeadershipMember {
    const RESOURCE: &'static str = "leadership";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Career {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub department: String,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub employment_type: Option<String>,
    pub description: String,
    pub posted_at: Option<String>,
    pub apply_url: Option<String>,
}

impl Collection for Career {
    const RESOURCE: &'static str = "careers";
}
