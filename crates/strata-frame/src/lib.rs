pub mod column;
pub mod dataframe;
pub mod description;
pub mod error;
pub mod ingest;
pub mod key_derive;
pub mod row;
pub mod schema;
pub mod value;

pub use column::{Column, Elem, FullColumn, Storage, CHUNK_SIZE};
pub use dataframe::{load, load_blocking, DataFrame, RowVisitor, RowWriter};
pub use description::{ColumnDescription, DataFrameDescription};
pub use error::FrameError;
pub use row::Row;
pub use schema::Schema;
pub use value::Value;
