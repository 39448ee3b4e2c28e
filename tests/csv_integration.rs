use std::{io::Write, path::Path};

use spring_batch_tutorial::{
    BatchError,
    core::{
        item::ItemReader,
        job::JobExecution,
        parameters::JobParameters,
        step::{Step, StepExecution, StepStatus},
    },
    item::csv::csv_reader::CsvItemReaderBuilder,
    jobs::{item_reader::csv_file_step, person::Person},
};
use tempfile::NamedTempFile;

fn fixture_reader(path: &Path) -> impl ItemReader<Person> {
    CsvItemReaderBuilder::new()
        .lines_to_skip(1)
        .names(&["id", "name", "age", "address"])
        .from_path(path)
        .unwrap()
}

fn read_all(reader: &impl ItemReader<Person>) -> Result<Vec<Person>, BatchError> {
    let mut people = Vec::new();
    while let Some(person) = reader.read()? {
        people.push(person);
    }
    Ok(people)
}

#[test]
fn fixture_file_is_read_without_its_header() {
    let reader = fixture_reader(Path::new("resources/test.csv"));

    let people = read_all(&reader).unwrap();

    assert_eq!(people.len(), 3);
    assert_eq!(people[0], Person::new(1, "이경원", "32", "인천"));
    assert_eq!(people[2].id, 3);
}

#[test]
fn csv_file_step_reads_every_data_row() {
    let step = csv_file_step(Path::new("resources/test.csv")).unwrap();
    let mut job_execution = JobExecution::new("itemReaderJob", JobParameters::new());
    let mut step_execution = StepExecution::new(step.name());

    step.execute(&mut step_execution, &mut job_execution).unwrap();

    assert_eq!(step_execution.status, StepStatus::Success);
    assert_eq!(step_execution.read_count, 3);
    assert_eq!(step_execution.write_count, 3);
    assert_eq!(step_execution.commit_count, 1);
}

#[test]
fn csv_file_step_reads_the_file_again_on_each_execution() {
    let step = csv_file_step(Path::new("resources/test.csv")).unwrap();
    let mut job_execution = JobExecution::new("itemReaderJob", JobParameters::new());

    for _ in 0..2 {
        let mut step_execution = StepExecution::new(step.name());
        step.execute(&mut step_execution, &mut job_execution).unwrap();

        assert_eq!(step_execution.read_count, 3);
        assert_eq!(step_execution.write_count, 3);
    }
}

#[test]
fn more_rows_than_a_chunk_are_committed_in_chunks() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id,name,age,address").unwrap();
    for i in 1..=25 {
        writeln!(file, "{},name{},{},address{}", i, i, 20 + i, i).unwrap();
    }

    let step = csv_file_step(file.path()).unwrap();
    let mut job_execution = JobExecution::new("itemReaderJob", JobParameters::new());
    let mut step_execution = StepExecution::new(step.name());

    step.execute(&mut step_execution, &mut job_execution).unwrap();

    assert_eq!(step_execution.read_count, 25);
    assert_eq!(step_execution.commit_count, 3);
}

#[test]
fn non_numeric_id_fails_the_step() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "id,name,age,address").unwrap();
    writeln!(file, "one,name,20,address").unwrap();

    let step = csv_file_step(file.path()).unwrap();
    let mut job_execution = JobExecution::new("itemReaderJob", JobParameters::new());
    let mut step_execution = StepExecution::new(step.name());

    let result = step.execute(&mut step_execution, &mut job_execution);

    assert!(matches!(result, Err(BatchError::ItemReader(_))));
    assert_eq!(step_execution.status, StepStatus::ReadError);
    assert_eq!(step_execution.read_error_count, 1);
}
