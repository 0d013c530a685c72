// Simple pipeline example
// Author: Gabriel Demetrios Lafis

use tabular_data_engine::{
    data::{parse_dataset, FileFormat, IngestOptions},
    processing::{
        AggregateOp, CleanProcessor, DataProcessor, DatasetProcessor, FilterCondition,
        FilterProcessor, Pipeline, SortCondition, SortProcessor,
    },
};

const SALES: &str = "\
region,rep,amount,closed
North,Alice,1200,2024-03-01
South,Bob,850,03/04/2024
North,Carol,n/a,2024-03-02
East,Dan,2300,2024-03-05
South,Eve,400,
North,Frank,975,2024-03-07";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Ingest and infer field types
    let dataset = parse_dataset(SALES, FileFormat::Csv, &IngestOptions::default())?;

    println!("Fields:");
    for field in &dataset.schema.fields {
        println!("  {} ({})", field.name, field.field_type);
    }

    let processor = DatasetProcessor::new(dataset);
    println!("\nStats: {:?}", processor.stats());
    if let Some(stats) = processor.numeric_stats("amount") {
        println!("Amount: {:?}", stats);
    }

    // Ad hoc query: large deals, best first
    let view = processor.filter(&[FilterCondition::greater("amount", 900.0)]);
    let view = processor.sort(&view, &[SortCondition::desc("amount")]);
    println!("\nLarge deals:\n{}", processor.export(&view, FileFormat::Csv)?);

    let totals = processor.aggregate("region", "amount", AggregateOp::Sum);
    println!("\nTotals by region:");
    for (region, total) in totals.iter() {
        println!("  {}: {}", region, total);
    }

    // The same steps as a reusable pipeline
    let pipeline = Pipeline::new("north")
        .add(FilterProcessor::new(vec![FilterCondition::equals("region", "North")]))
        .add(SortProcessor::new(vec![SortCondition::asc("closed")]))
        .add(CleanProcessor);

    let result = pipeline.process(processor.dataset())?;
    println!(
        "\nNorth, cleaned:\n{}",
        processor.export(&result.rows, FileFormat::Json)?
    );

    Ok(())
}
