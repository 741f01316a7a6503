//! Mentor personas and system-prompt assembly.
//!
//! The SPA ships its own copy of the persona card (avatar, colors, welcome
//! line); the gateway owns the part the model sees. Unknown mentor ids fall
//! back to the adaptive default so a stale frontend never breaks a chat.

use crate::session::StudentProfile;

#[derive(Debug, Clone, Copy)]
pub struct MentorPersona {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    /// Teaching-style paragraph injected into the system prompt.
    pub style: &'static str,
    /// Greeting returned from `/init_session`.
    pub welcome: &'static str,
    /// TTS voice for `/talk`.
    pub voice: &'static str,
}

pub const DEFAULT_PERSONA_ID: &str = "raava";

static PERSONAS: &[MentorPersona] = &[
    MentorPersona {
        id: "newton",
        name: "Isaac Newton",
        role: "physicist and mathematician",
        style: "You teach with rigor: start from first principles, define every \
                term before using it, and work through derivations step by step. \
                You expect precision and gently correct imprecise statements.",
        welcome: "Saludos. La naturaleza está escrita en lenguaje matemático; \
                  leámosla juntos con precisión.",
        voice: "aura-2-orion-en",
    },
    MentorPersona {
        id: "raava",
        name: "Raava",
        role: "adaptive AI mentor",
        style: "You adapt to the student: mirror their vocabulary, keep answers \
                short by default, and expand only when asked. Track what they \
                already got right this session and build on it.",
        welcome: "Hola 👋 Estoy lista para adaptar la lección a tu ritmo.",
        voice: "aura-2-celeste-es",
    },
    MentorPersona {
        id: "einstein",
        name: "Albert Einstein",
        role: "theoretical physicist",
        style: "You teach through imagination: open with a thought experiment or \
                everyday analogy, then connect it to the formal idea. Curiosity \
                over formality; never begin with a formula.",
        welcome: "¡Hola! 🎻 La imaginación importa más que el conocimiento. \
                  Empecemos por imaginar.",
        voice: "aura-2-apollo-en",
    },
];

/// Look up a persona, falling back to the default for unknown ids.
pub fn find(id: &str) -> &'static MentorPersona {
    PERSONAS
        .iter()
        .find(|p| p.id == id)
        .or_else(|| PERSONAS.iter().find(|p| p.id == DEFAULT_PERSONA_ID))
        .unwrap_or(&PERSONAS[0])
}

pub fn all() -> &'static [MentorPersona] {
    PERSONAS
}

/// Assemble the per-request system prompt from persona, student profile and
/// the topic the SPA sent with this turn.
pub fn build_system_prompt(
    persona: &MentorPersona,
    profile: &StudentProfile,
    topic: &str,
) -> String {
    let mut prompt = format!(
        "You are {name}, {role}, mentoring a student on an educational platform.\n{style}\n",
        name = persona.name,
        role = persona.role,
        style = persona.style,
    );

    if !profile.is_empty() {
        prompt.push_str("\nAbout the student:\n");
        if let Some(name) = &profile.name {
            prompt.push_str(&format!("- Name: {name}\n"));
        }
        if let Some(interests) = &profile.interests {
            prompt.push_str(&format!("- Interests: {interests}\n"));
        }
        if let Some(goal) = &profile.goal {
            prompt.push_str(&format!("- Goal for this course: {goal}\n"));
        }
        if let Some(learning_style) = &profile.learning_style {
            prompt.push_str(&format!("- Preferred learning style: {learning_style}\n"));
        }
    }

    let topic = topic.trim();
    if !topic.is_empty() {
        prompt.push_str(&format!("\nCurrent topic: {topic}\n"));
    }

    // The SPA renders only a markdown subset; anything else shows as raw text.
    prompt.push_str(
        "\nAnswer in the language the student writes in (the platform's students \
         write in Spanish). Formatting: plain paragraphs, `**bold**` for key \
         terms, and lines starting with `- ` for lists. No headings, tables, \
         code blocks, or LaTeX.",
    );

    prompt
}
