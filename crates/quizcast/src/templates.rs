//! Presentation templates and the deterministic job-to-template mapping.

use rand::seq::SliceRandom;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Ordered template list. Reordering it changes every seeded assignment.
pub const TEMPLATES: [TemplateInfo; 3] = [
    TemplateInfo {
        id: "template1",
        name: "Gradient Blobs",
        description: "Modern gradient background with animated blobs and geometric shapes",
    },
    TemplateInfo {
        id: "template2",
        name: "Starfield",
        description: "Space-themed with twinkling stars, particles, and nebula clouds",
    },
    TemplateInfo {
        id: "template3",
        name: "Cute Education",
        description: "Cute and engaging design with difficulty badges, star progress, hourglass timer, and confetti celebrations",
    },
];

/// 32-bit string hash over UTF-16 code units, wrapping at every step.
///
/// Matches `hash = ((hash << 5) - hash) + charCode` evaluated with int32
/// semantics, so assignments made by earlier tooling stay the same.
pub fn seed_hash(identity: &str) -> i32 {
    identity.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// The template a job always renders with.
pub fn seeded_template(identity: &str) -> &'static TemplateInfo {
    let index = seed_hash(identity).unsigned_abs() as usize % TEMPLATES.len();
    &TEMPLATES[index]
}

/// Uniformly random template, for previews only.
pub fn random_template() -> &'static TemplateInfo {
    TEMPLATES
        .choose(&mut rand::thread_rng())
        .unwrap_or(&TEMPLATES[0])
}

pub fn template_by_id(id: &str) -> Option<&'static TemplateInfo> {
    TEMPLATES.iter().find(|template| template.id == id)
}

pub fn all_template_ids() -> Vec<&'static str> {
    TEMPLATES.iter().map(|template| template.id).collect()
}
