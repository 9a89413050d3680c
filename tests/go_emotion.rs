//! Tests against the real GoEmotions checkpoint.
//! Run with: cargo test --features integration

#![cfg(feature = "integration")]

use friday_mood::emotion::EmotionPipelineBuilder;
use friday_mood::reply::ReplyTable;

#[test]
fn happy_message_gets_joy_reply() -> anyhow::Result<()> {
    let pipeline = EmotionPipelineBuilder::go_emotion().cpu().build()?;

    let output = pipeline.run("I am so happy today 😄")?;
    let top = output.top().expect("GoEmotions has 28 labels");

    assert_eq!(top.label, "joy");
    let reply = ReplyTable::friday().respond(top);
    assert!(reply.starts_with("Detected Emotion: Joy ("));
    assert!(reply.ends_with("\nFRIDAY: You sound happy today 😄! Let's keep the energy up!"));
    Ok(())
}

#[test]
fn vocabulary_and_ranking() -> anyhow::Result<()> {
    let pipeline = EmotionPipelineBuilder::go_emotion().build()?;

    assert_eq!(pipeline.labels().len(), 28);
    assert!(pipeline.labels().iter().any(|l| l == "nervousness"));

    let output = pipeline.run("I'm terrified about tomorrow's surgery 😟")?;
    assert_eq!(output.emotions.len(), 3);
    assert!(output
        .emotions
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
    for e in &output.emotions {
        assert!((0.0..=1.0).contains(&e.score));
    }
    Ok(())
}
