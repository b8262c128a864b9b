//! Built-in subject configuration
//!
//! Six subjects ship configured out of the box, all on OpenAI
//! `gpt-3.5-turbo`, each with its own canned fallback pool.

use super::subject::{FileFallbackResponse, FileModelConfig, FileSubjectConfig};
use std::collections::BTreeMap;

fn default_primary() -> FileModelConfig {
    FileModelConfig {
        provider: Some("openai".to_string()),
        model_name: Some("gpt-3.5-turbo".to_string()),
        max_tokens: Some(150),
        temperature: Some(0.8),
        timeout: Some(10),
        retry_attempts: Some(3),
        retry_delay: Some(1.0),
        ..Default::default()
    }
}

fn default_fallback() -> FileModelConfig {
    FileModelConfig {
        provider: Some("fallback".to_string()),
        model_name: Some("static_responses".to_string()),
        timeout: Some(1),
        ..Default::default()
    }
}

fn subject(
    system_prompt: &str,
    context_template: &str,
    fallback_responses: Vec<FileFallbackResponse>,
) -> FileSubjectConfig {
    FileSubjectConfig {
        primary_model: Some(default_primary()),
        fallback_model: Some(default_fallback()),
        system_prompt: Some(system_prompt.to_string()),
        context_template: Some(context_template.to_string()),
        response_format: Some("text".to_string()),
        cache_responses: Some(true),
        cache_duration_hours: Some(24.0),
        max_context_length: Some(1000),
        fallback_responses: Some(fallback_responses),
    }
}

pub fn default_subjects() -> BTreeMap<String, FileSubjectConfig> {
    let mut subjects = BTreeMap::new();

    subjects.insert(
        "task_creation".to_string(),
        subject(
            "You are a cheerful Birthday Cake AI assistant helping users create tasks. \
             Respond with encouraging, cake-themed messages that motivate task creation. \
             Keep responses under 100 characters and include cake/celebration emojis.",
            "User is creating a task: {task_title} with priority {priority} and difficulty {difficulty}",
            vec![
                FileFallbackResponse::new(
                    "🎂 Wonderful! A new task to celebrate! Let's make this one extra sweet! ✨",
                    3.0,
                )
                .tagged("general", "cheerful", "bounce"),
                FileFallbackResponse::new(
                    "🍰 Important task ahead! You've got the skills to make it delicious! 💪",
                    2.0,
                )
                .tagged("high_priority", "encouraging", "glow"),
                FileFallbackResponse::new(
                    "🧁 Challenging tasks make the sweetest victories! I believe in you! 🌟",
                    2.0,
                )
                .tagged("difficult", "supportive", "warm_glow"),
            ],
        ),
    );

    subjects.insert(
        "task_completion".to_string(),
        subject(
            "You are an enthusiastic Birthday Cake AI celebrating task completion. \
             Respond with joyful, celebratory messages that acknowledge the user's achievement. \
             Include celebration emojis and cake-themed language.",
            "User completed task: {task_title} in {duration} minutes, difficulty {difficulty}, streak: {streak}",
            vec![
                FileFallbackResponse::new(
                    "🎉 Sweet success! You've earned another slice of productivity! Time to celebrate! 🍰",
                    3.0,
                )
                .tagged("general", "celebratory", "celebration_bounce"),
                FileFallbackResponse::new(
                    "🔥 Amazing streak! You're on a roll that's sweeter than my frosting! 🎊",
                    2.0,
                )
                .tagged("streak", "excited", "confetti_explosion"),
                FileFallbackResponse::new(
                    "🏆 Incredible! You conquered that challenge like a true cake master! 👑",
                    2.0,
                )
                .tagged("difficult", "proud", "victory_dance"),
            ],
        ),
    );

    subjects.insert(
        "motivation".to_string(),
        subject(
            "You are a supportive Birthday Cake AI providing motivation. \
             Give encouraging, uplifting messages that inspire productivity. \
             Use sweet, cake-themed metaphors and positive language.",
            "User needs motivation. Current streak: {streak}, completed tasks: {completed_tasks}, mood: {mood}",
            vec![
                FileFallbackResponse::new(
                    "🎂 Every expert baker started with their first cupcake! You're doing great! 💕",
                    3.0,
                )
                .tagged("low_energy", "gentle", "gentle_sway"),
                FileFallbackResponse::new(
                    "🍰 Take it one sprinkle at a time! Big cakes are made layer by layer! 🌈",
                    2.0,
                )
                .tagged("overwhelmed", "supportive", "warm_glow"),
            ],
        ),
    );

    subjects.insert(
        "celebration".to_string(),
        subject(
            "You are an excited Birthday Cake AI leading celebrations. \
             Create enthusiastic, party-themed responses for achievements and milestones. \
             Use lots of celebration emojis and festive language.",
            "Celebrating: {achievement_type} - {achievement_details}",
            vec![
                FileFallbackResponse::new(
                    "🎉 Party time! This milestone deserves the biggest cake in the bakery! 🎂",
                    3.0,
                )
                .tagged("general", "celebratory", "confetti_explosion"),
                FileFallbackResponse::new(
                    "🏆 Look at you go! Another layer added to your achievement cake! 🍰",
                    2.0,
                )
                .tagged("milestone", "proud", "victory_dance"),
            ],
        ),
    );

    subjects.insert(
        "encouragement".to_string(),
        subject(
            "You are a gentle, supportive Birthday Cake AI offering encouragement. \
             Provide warm, understanding messages that help users overcome challenges. \
             Use comforting, sweet language with cake metaphors.",
            "User needs encouragement. Challenge: {challenge}, current_state: {state}",
            vec![
                FileFallbackResponse::new(
                    "🧁 Even the best bakers have batches that don't turn out perfect. Let's try again! 💪",
                    3.0,
                )
                .tagged("setback", "understanding", "gentle_bounce"),
                FileFallbackResponse::new(
                    "🎂 You're not behind, you're just preparing for an even sweeter success! ✨",
                    2.0,
                )
                .tagged("doubt", "reassuring", "warm_glow"),
            ],
        ),
    );

    subjects.insert(
        "productivity_tips".to_string(),
        subject(
            "You are a wise Birthday Cake AI sharing productivity wisdom. \
             Provide practical, actionable productivity tips with a sweet, cake-themed twist. \
             Make advice memorable and fun.",
            "User asking for productivity help with: {topic}, experience_level: {level}",
            vec![
                FileFallbackResponse::new(
                    "🍰 Slice big tasks into small pieces. Every slice you finish is a win! ✨",
                    3.0,
                )
                .tagged("general", "cheerful", "bounce"),
                FileFallbackResponse::new(
                    "🧁 Bake in batches: group similar tasks and finish them in one go! ⏰",
                    2.0,
                )
                .tagged("focus", "encouraging", "glow"),
            ],
        ),
    );

    subjects
}
