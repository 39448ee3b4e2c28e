/// CSV support for reading delimited flat files.
///
/// The [`csv_reader::CsvItemReader`] deserializes each row into a Rust struct
/// using serde. Column names either come from the file's header row or are
/// declared on the builder, which lets a reader skip a header line it does
/// not trust and still map fields by name.
///
/// # Examples
///
/// ```
/// use spring_batch_tutorial::item::csv::csv_reader::CsvItemReaderBuilder;
/// use spring_batch_tutorial::core::item::ItemReader;
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Person {
///     id: i32,
///     name: String,
///     age: String,
///     address: String,
/// }
///
/// let csv_data = "\
/// 아이디,이름,나이,주소
/// 1,Kim,31,Seoul
/// 2,Lee,28,Busan
/// ";
///
/// let reader = CsvItemReaderBuilder::new()
///     .lines_to_skip(1)
///     .names(&["id", "name", "age", "address"])
///     .from_reader(csv_data.as_bytes());
///
/// let mut people: Vec<Person> = Vec::new();
/// while let Some(person) = reader.read().unwrap() {
///     people.push(person);
/// }
///
/// assert_eq!(people.len(), 2);
/// assert_eq!(people[0].name, "Kim");
/// assert_eq!(people[1].address, "Busan");
/// ```

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;
