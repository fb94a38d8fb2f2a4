//! Step scripts for every calming/sensory exercise.

use std::time::Duration;

use super::ExerciseKind;
use crate::voice::BreathPhase;

/// One narrated step.
#[derive(Debug, Clone)]
pub struct ExerciseStep {
    pub text: String,
    pub duration: Duration,
    /// Set on breathing-cycle steps so the runner speaks them as cues
    /// (high priority, slow rate) instead of instructions.
    pub breath: Option<BreathPhase>,
}

impl ExerciseStep {
    fn timed(text: &str, millis: u64) -> Self {
        ExerciseStep {
            text: text.to_string(),
            duration: Duration::from_millis(millis),
            breath: None,
        }
    }

    fn breath(phase: BreathPhase, seconds: u64) -> Self {
        ExerciseStep {
            text: String::new(),
            duration: Duration::from_secs(seconds),
            breath: Some(phase),
        }
    }
}

/// A full exercise: a linear step sequence, optionally looping until
/// stopped, with an opening instruction and a completion message.
#[derive(Debug, Clone)]
pub struct ExerciseScript {
    pub kind: ExerciseKind,
    pub intro: &'static str,
    pub steps: Vec<ExerciseStep>,
    pub looped: bool,
    pub completion: &'static str,
}

/// Build the script for an exercise kind.
pub fn script_for(kind: ExerciseKind) -> ExerciseScript {
    match kind {
        ExerciseKind::Breathing => ExerciseScript {
            kind,
            intro: "Starting breathing exercise. Follow along with the circle.",
            steps: vec![
                ExerciseStep::breath(BreathPhase::Inhale, 4),
                ExerciseStep::breath(BreathPhase::HoldIn, 2),
                ExerciseStep::breath(BreathPhase::Exhale, 4),
                ExerciseStep::breath(BreathPhase::HoldOut, 2),
            ],
            looped: true,
            completion: "Breathing exercise stopped",
        },
        ExerciseKind::MuscleRelaxation => ExerciseScript {
            kind,
            intro: "Get comfortable and close your eyes if you'd like...",
            steps: vec![
                ExerciseStep::timed("Take three deep breaths to begin...", 6000),
                ExerciseStep::timed("Clench your fists tightly... hold for 5 seconds", 6000),
                ExerciseStep::timed("Now relax your hands completely. Feel the difference.", 4000),
                ExerciseStep::timed("Tense your arms by pulling them up to your shoulders", 6000),
                ExerciseStep::timed("Let your arms drop and relax completely", 4000),
                ExerciseStep::timed("Scrunch up your face muscles... hold tight", 6000),
                ExerciseStep::timed("Relax your face. Let your jaw drop slightly.", 4000),
                ExerciseStep::timed("Lift your shoulders up to your ears", 6000),
                ExerciseStep::timed("Drop your shoulders and feel them melt down", 4000),
                ExerciseStep::timed("Tighten your stomach muscles", 6000),
                ExerciseStep::timed("Relax your stomach completely", 4000),
                ExerciseStep::timed("Point your toes and tense your leg muscles", 6000),
                ExerciseStep::timed("Relax your legs completely", 4000),
                ExerciseStep::timed(
                    "Take a moment to notice how relaxed your whole body feels",
                    8000,
                ),
                ExerciseStep::timed(
                    "Excellent work! You've completed the relaxation exercise.",
                    4000,
                ),
            ],
            looped: false,
            completion: "Great job! You should feel more relaxed now.",
        },
        ExerciseKind::Grounding => ExerciseScript {
            kind,
            intro: "This exercise helps you focus on the present moment...",
            steps: vec![
                ExerciseStep::timed(
                    "Look around and name 5 things you can SEE. Take your time with each one.",
                    15000,
                ),
                ExerciseStep::timed(
                    "Listen carefully and identify 4 things you can HEAR right now.",
                    12000,
                ),
                ExerciseStep::timed(
                    "Notice 3 things you can TOUCH or FEEL. Maybe your clothes, chair, or the air.",
                    10000,
                ),
                ExerciseStep::timed(
                    "Try to notice 2 things you can SMELL. Take a gentle breath in.",
                    8000,
                ),
                ExerciseStep::timed(
                    "Can you notice 1 thing you can TASTE? Maybe run your tongue over your lips.",
                    6000,
                ),
                ExerciseStep::timed(
                    "Excellent! You've grounded yourself in the present moment. How do you feel?",
                    6000,
                ),
            ],
            looped: false,
            completion: "Great job grounding yourself in the present moment!",
        },
        ExerciseKind::DeskStretches => ExerciseScript {
            kind,
            intro: "Let's do some gentle stretches to release tension...",
            steps: vec![
                ExerciseStep::timed(
                    "Neck rolls: Slowly roll your head in a circle. 5 times each direction.",
                    10000,
                ),
                ExerciseStep::timed(
                    "Shoulder shrugs: Lift your shoulders up to your ears, hold for 3 seconds, then relax.",
                    8000,
                ),
                ExerciseStep::timed(
                    "Wrist circles: Make gentle circles with your wrists. Both directions.",
                    6000,
                ),
                ExerciseStep::timed(
                    "Spinal twist: Sit up straight and gently twist your upper body left, then right.",
                    8000,
                ),
                ExerciseStep::timed(
                    "Reach up high: Stretch your arms up toward the ceiling and hold for 5 seconds.",
                    6000,
                ),
                ExerciseStep::timed("Deep breath: Take 3 slow, deep breaths. You did great!", 6000),
            ],
            looped: false,
            completion: "Nice stretching! Your body should feel more relaxed now.",
        },
        ExerciseKind::BodyScan => ExerciseScript {
            kind,
            intro: "Get comfortable and close your eyes if you'd like...",
            steps: [
                "Close your eyes and take three deep breaths...",
                "Notice the top of your head. Is there any tension there?",
                "Move your attention to your forehead and around your eyes...",
                "Notice your jaw. Let it relax and drop slightly open.",
                "Feel your neck and shoulders. Let them soften and drop.",
                "Pay attention to your arms. Let them feel heavy and relaxed.",
                "Notice your chest rising and falling with each breath.",
                "Feel your stomach and lower back. Let them relax completely.",
                "Notice your hips and the feeling of sitting in your chair.",
                "Feel your legs from your thighs down to your feet.",
                "Take a moment to notice your whole body feeling calm and relaxed.",
                "When you're ready, gently open your eyes. Great job!",
            ]
            .into_iter()
            .map(|text| ExerciseStep::timed(text, 5000))
            .collect(),
            looped: false,
            completion: "Wonderful! You should feel more aware and relaxed.",
        },
        ExerciseKind::Visualization => ExerciseScript {
            kind,
            intro: "Close your eyes and imagine your perfect peaceful place...",
            steps: [
                "Close your eyes and take three slow, deep breaths...",
                "Imagine you're in the most peaceful place you can think of. Maybe a beach, forest, or cozy room...",
                "Look around this peaceful place. What colors do you see?",
                "What sounds can you hear in your peaceful place? Maybe birds, waves, or gentle music?",
                "What does the air feel like? Is it warm and sunny, or cool and refreshing?",
                "Take a deep breath in your peaceful place. What do you smell?",
                "Find a comfortable spot to sit or lie down in your peaceful place.",
                "Feel how safe and calm you are here. This is your special place.",
                "Remember that you can come back to this peaceful place anytime you need to feel calm.",
                "When you're ready, slowly open your eyes and bring that peaceful feeling with you.",
            ]
            .into_iter()
            .map(|text| ExerciseStep::timed(text, 6000))
            .collect(),
            looped: false,
            completion: "Beautiful! Remember, you can visit your peaceful place anytime.",
        },
        ExerciseKind::Affirmations => ExerciseScript {
            kind,
            intro: "Here are some positive affirmations just for you.",
            steps: [
                "I am capable and strong",
                "I can handle challenges with courage",
                "I am kind to myself and others",
                "I am learning and growing every day",
                "I can take deep breaths when I feel overwhelmed",
                "I am proud of trying my best",
                "I deserve to feel happy and calm",
                "I can ask for help when I need it",
                "I am unique and that makes me special",
                "I choose to focus on good thoughts",
            ]
            .into_iter()
            .map(|text| ExerciseStep::timed(text, 6000))
            .collect(),
            looped: false,
            completion: "Keep those good thoughts with you today!",
        },
        ExerciseKind::Counting => ExerciseScript {
            kind,
            intro: "Count backwards from 100 by 3s. Take a breath with each number.",
            steps: counting_steps(),
            looped: false,
            completion: "Great job counting! Your mind should feel more focused now.",
        },
    }
}

/// 100, 97, ... down past zero; every fifth number is spoken aloud.
fn counting_steps() -> Vec<ExerciseStep> {
    let mut steps = Vec::new();
    let mut current: i32 = 100;
    while current >= 0 {
        let spoken = current % 15 == 1;
        steps.push(ExerciseStep {
            text: if spoken {
                current.to_string()
            } else {
                String::new()
            },
            duration: Duration::from_millis(2000),
            breath: None,
        });
        current -= 3;
    }
    steps
}
