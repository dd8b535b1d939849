use docqa_core::config::Settings;
use docqa_core::traits::Generator;
use docqa_llm::{default_generator, FakeGenerator};

#[test]
fn fake_generator_records_prompts() {
    let generator = FakeGenerator::answering("Boil water for one minute.");
    assert_eq!(generator.calls(), 0);
    let answer = generator.generate("How do I purify water?").expect("answer");
    assert_eq!(answer, "Boil water for one minute.");
    assert_eq!(generator.calls(), 1);
    assert_eq!(generator.last_prompt().as_deref(), Some("How do I purify water?"));
}

#[test]
fn failing_generator_surfaces_message() {
    let generator = FakeGenerator::failing("quota exceeded");
    let err = generator.generate("anything").unwrap_err();
    assert!(err.to_string().contains("quota exceeded"));
    assert_eq!(generator.calls(), 1);
}

#[test]
fn default_generator_honours_fake_switch() {
    std::env::set_var("APP_USE_FAKE_LLM", "1");
    let generator = default_generator(&Settings::default().generation, None).expect("generator");
    assert!(!generator.generate("prompt").expect("answer").is_empty());
}

#[test]
fn echo_summarizes_question_and_sources() {
    let prompt = "Context:\nSource 1:\nFile: a.pdf\n---\nSource 2:\nFile: b.pdf\n\nQuestion:\nHow do I start a fire?\n\nInstructions:\n1. ...";
    let answer = FakeGenerator::echo().generate(prompt).expect("answer");
    assert_eq!(answer, "Stub answer to \"How do I start a fire?\" drawn from 2 source(s).");
}
