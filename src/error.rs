use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("could not read {}", _0.display())]
    Input(#[error(not(source))] PathBuf),
    #[display("could not import the beatmap pack")]
    Import,
    #[display("could not write the portable collection file {}", _0.display())]
    Export(#[error(not(source))] PathBuf),
    #[display("could not update the collection database {}", _0.display())]
    Database(#[error(not(source))] PathBuf),
    #[display("the osu! directory is not configured (use --osu-dir or set osu_dir)")]
    MissingOsuDir,
    #[display("{_0} collection name(s) already exist in the database")]
    Duplicates(#[error(not(source))] usize),
}
