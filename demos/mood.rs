use friday_mood::emotion::EmotionPipelineBuilder;
use friday_mood::error::Result;
use friday_mood::reply::ReplyTable;

fn main() -> Result<()> {
    println!("Building pipeline...");

    let pipeline = EmotionPipelineBuilder::go_emotion().build()?;

    println!("Pipeline built successfully.");

    let texts = [
        "I am so happy today 😄",
        "I miss my old friends 😢",
        "Why does this keep breaking?! 😤",
        "The meeting is at 3pm.",
    ];

    for text in texts {
        let output = pipeline.run(text)?;

        println!("\n=== {text} ===");
        println!("Normalized: \"{}\"", output.text);
        for e in &output.emotions {
            println!("  {}: {:.4}", e.label, e.score);
        }
        if let Some(top) = output.top() {
            println!("{}", ReplyTable::friday().respond(top));
        }
        println!(
            "Completed in {:.2}ms",
            output.stats.total_time.as_secs_f64() * 1000.0
        );
    }

    Ok(())
}
