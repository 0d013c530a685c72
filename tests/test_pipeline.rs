// Pipeline tests
// Author: Gabriel Demetrios Lafis

use std::io::Write;

use rand::rngs::StdRng;
use rand::SeedableRng;

use tabular_data_engine::{
    data::{
        load_dataset, parse_csv, parse_dataset, DataSet, FieldType, FileFormat, IngestOptions,
        Row, SchemaBuilder, Value,
    },
    processing::{
        AggregateOp, AggregateProcessor, CleanProcessor, DataProcessor, DatasetProcessor,
        FilterCondition, FilterProcessor, Pipeline, SampleMethod, SampleProcessor,
        SortCondition, SortProcessor,
    },
};

fn sales() -> DataSet {
    let csv = "region,product,units,date\n\
               North,Widget,10,2024-01-05\n\
               South,Gadget,4,2024-01-02\n\
               North,Gadget,n/a,2024-01-03\n\
               East,Widget,7,\n\
               South,Widget,12,2024-01-01\n\
               ,Gizmo,3,2024-01-04";
    parse_dataset(csv, FileFormat::Csv, &IngestOptions::default()).unwrap()
}

#[test]
fn test_ingestion_infers_types() {
    let dataset = sales();

    assert_eq!(dataset.len(), 6);
    assert_eq!(dataset.schema.field_type("region"), Some(FieldType::String));
    assert_eq!(dataset.schema.field_type("units"), Some(FieldType::Number));
    assert_eq!(dataset.schema.field_type("date"), Some(FieldType::Date));
    assert_eq!(
        dataset.schema.names().collect::<Vec<_>>(),
        vec!["region", "product", "units", "date"]
    );
}

#[test]
fn test_clean_scenario() {
    let schema = SchemaBuilder::new().add_string("a").add_number("n").build();
    let rows = vec![
        Row::new().with("a", "x").with("n", "5"),
        Row::new().with("a", "y").with("n", "abc"),
    ];
    let processor = DatasetProcessor::new(DataSet::with_rows(schema, rows));

    assert_eq!(
        processor.clean(),
        vec![
            Row::new().with("a", "x").with("n", 5.0),
            Row::new().with("a", "y").with("n", 0.0),
        ]
    );
}

#[test]
fn test_average_excludes_unparsable() {
    let schema = SchemaBuilder::new().add_string("a").add_number("n").build();
    let rows = vec![
        Row::new().with("a", "g").with("n", "10"),
        Row::new().with("a", "g").with("n", "abc"),
        Row::new().with("a", "g").with("n", "20"),
    ];
    let processor = DatasetProcessor::new(DataSet::with_rows(schema, rows));

    let result = processor.aggregate("a", "n", AggregateOp::Avg);
    assert_eq!(result.len(), 1);
    assert_eq!(result.get("g"), Some(&15.0));
}

#[test]
fn test_between_scenario() {
    let processor = DatasetProcessor::new(DataSet::with_rows(
        Default::default(),
        vec![Row::new().with("v", "5")],
    ));
    let condition: FilterCondition = serde_json::from_str(
        r#"{"field": "v", "operator": "between", "value": "1", "value2": "10"}"#,
    )
    .unwrap();

    assert_eq!(processor.filter(&[condition]).len(), 1);
}

#[test]
fn test_csv_export_quotes_commas() {
    let processor = DatasetProcessor::new(DataSet::with_rows(Default::default(), vec![]));
    let rows = vec![Row::new().with("x", "a,b")];

    assert_eq!(processor.export(&rows, FileFormat::Csv).unwrap(), "x\n\"a,b\"");
    assert_eq!(processor.export(&[], FileFormat::Csv).unwrap(), "");
}

#[test]
fn test_numeric_stats_scenario() {
    let schema = SchemaBuilder::new().add_number("n").build();
    let rows = ["1", "2", "3", "4"]
        .iter()
        .map(|n| Row::new().with("n", *n))
        .collect();
    let processor = DatasetProcessor::new(DataSet::with_rows(schema, rows));

    let stats = processor.numeric_stats("n").unwrap();
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 4.0);
    assert_eq!(stats.avg, 2.5);
    assert_eq!(stats.median, 2.5);
}

#[test]
fn test_clean_is_idempotent() {
    let dataset = sales();
    let once = CleanProcessor.process(&dataset).unwrap();
    let twice = CleanProcessor.process(&once).unwrap();

    assert_eq!(once.rows, twice.rows);
    assert_eq!(once.rows[2].value("units"), &Value::Number(0.0));
    assert_eq!(once.rows[3].value("date"), &Value::Missing);
}

#[test]
fn test_filter_monotonicity() {
    let processor = DatasetProcessor::new(sales());
    let c1 = vec![FilterCondition::contains("product", "g")];
    let c2 = vec![
        FilterCondition::greater("units", 5.0),
        FilterCondition::not_empty("region"),
    ];

    let wide = processor.filter(&c1);
    let narrow = processor.filter(&[c1, c2].concat());

    assert!(narrow.len() <= wide.len());
    assert!(narrow.iter().all(|row| wide.contains(row)));
}

#[test]
fn test_sort_stability() {
    let processor = DatasetProcessor::new(sales());
    let by_region = processor.sort(processor.rows(), &[SortCondition::asc("region")]);
    let again = processor.sort(
        &by_region,
        &[SortCondition::asc("region"), SortCondition::asc("missing_field")],
    );
    assert_eq!(by_region, again);

    // Rows tied on region keep their original relative order
    let products: Vec<String> = by_region
        .iter()
        .filter(|row| row.value("region") == &Value::text("North"))
        .map(|row| row.value("product").to_string())
        .collect();
    assert_eq!(products, vec!["Widget", "Gadget"]);
}

#[test]
fn test_multi_key_sort() {
    let processor = DatasetProcessor::new(sales());
    let sorted = processor.sort(
        processor.rows(),
        &[SortCondition::asc("product"), SortCondition::desc("units")],
    );

    let order: Vec<String> = sorted
        .iter()
        .map(|row| format!("{}/{}", row.value("product"), row.value("units")))
        .collect();
    // Descending reverses the whole order, so the unparsable cell leads
    assert_eq!(
        order,
        vec!["Gadget/n/a", "Gadget/4", "Gizmo/3", "Widget/12", "Widget/10", "Widget/7"]
    );
}

#[test]
fn test_aggregate_count_invariant() {
    let processor = DatasetProcessor::new(sales());
    for field in ["region", "product", "date", "nonexistent"] {
        let counts = processor.aggregate(field, "units", AggregateOp::Count);
        let total: f64 = counts.values().sum();
        assert_eq!(total as usize, processor.rows().len());
    }

    let groups = processor.group_by("region");
    assert_eq!(
        groups.keys().collect::<Vec<_>>(),
        vec!["North", "South", "East", "Unknown"]
    );
}

#[test]
fn test_csv_round_trip() {
    let mut rows = sales().rows;
    rows.push(
        Row::new()
            .with("region", "North, Upper")
            .with("product", "say \"hi\"")
            .with("units", "5")
            .with("date", "2024-02-01"),
    );
    rows.push(
        Row::new()
            .with("region", "\"quoted\"")
            .with("product", "a,b,\"c\"")
            .with("units", 2.5),
    );
    let processor = DatasetProcessor::new(DataSet::with_rows(sales().schema, rows));

    let text = processor.export(processor.rows(), FileFormat::Csv).unwrap();
    assert!(text.contains("\"North, Upper\",\"say \"\"hi\"\"\""));
    let parsed = parse_csv(&text).unwrap();

    assert_eq!(parsed.len(), processor.rows().len());
    for (original, restored) in processor.rows().iter().zip(&parsed) {
        for (key, value) in original.iter() {
            assert_eq!(restored.value(key).to_string(), value.to_string());
        }
    }
}

#[test]
fn test_json_export_is_pretty() {
    let processor = DatasetProcessor::new(sales());
    let cleaned = processor.clean();
    let text = processor.export(&cleaned[..1], FileFormat::Json).unwrap();

    let expected = "[\n  {\n    \"region\": \"North\",\n    \"product\": \"Widget\",\n    \"units\": 10,\n    \"date\": \"2024-01-05\"\n  }\n]";
    assert_eq!(text, expected);
}

#[test]
fn test_seeded_sampling_is_reproducible() {
    let processor = DatasetProcessor::new(sales());
    let a = processor.sample_with_rng(3, SampleMethod::Random, &mut StdRng::seed_from_u64(11));
    let b = processor.sample_with_rng(3, SampleMethod::Random, &mut StdRng::seed_from_u64(11));

    assert_eq!(a, b);
    assert_eq!(a.len(), 3);
    assert_eq!(processor.sample(100, SampleMethod::Random), processor.rows());
}

#[test]
fn test_processor_pipeline() {
    let pipeline = Pipeline::new("widgets")
        .add(FilterProcessor::new(vec![FilterCondition::equals("product", "Widget")]))
        .add(SortProcessor::new(vec![SortCondition::desc("units")]))
        .add(SampleProcessor::new(2, SampleMethod::First))
        .add(CleanProcessor);

    let result = pipeline.process(&sales()).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.rows[0].value("units"), &Value::Number(12.0));
    assert_eq!(result.rows[1].value("units"), &Value::Number(10.0));
}

#[test]
fn test_aggregate_processor() {
    let processor = AggregateProcessor::new("region", "units", AggregateOp::Sum);
    let result = processor.process(&sales()).unwrap();

    assert_eq!(result.len(), 4);
    assert_eq!(result.rows[0].value("region"), &Value::text("North"));
    assert_eq!(result.rows[0].value(&processor.output_field()), &Value::Number(10.0));
    assert_eq!(result.schema.field_type("sum_units"), Some(FieldType::Number));
}

#[test]
fn test_load_dataset_from_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[{{"id": 1, "name": "Ann", "joined": "03/15/2023"}}, {{"id": 2, "name": null}}]"#
    )
    .unwrap();

    let dataset = load_dataset(file.path(), &IngestOptions::default()).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.schema.field_type("id"), Some(FieldType::Number));
    assert_eq!(dataset.schema.field_type("joined"), Some(FieldType::Date));
    assert!(dataset.rows[1].value("name").is_missing());
}

#[test]
fn test_ingestion_truncates_rows() {
    let body: String = (0..1500).map(|i| format!("{}\n", i)).collect();
    let text = format!("n\n{}", body);
    let dataset = parse_dataset(&text, FileFormat::Csv, &IngestOptions::default()).unwrap();
    assert_eq!(dataset.len(), 1000);
}
