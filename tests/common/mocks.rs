//! Mock version of an ItemWriter of strings.
use mockall::mock;

use spring_batch_tutorial::core::item::{ItemWriter, ItemWriterResult};

mock! {
    pub Writer {}
    impl ItemWriter<String> for Writer {
        fn write(&self, items: &[String]) -> ItemWriterResult;
        fn flush(&self) -> ItemWriterResult;
    }
}
