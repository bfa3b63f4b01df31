use serde_json::Value;
use std::{fs, fmt::Display, path::Path};

use crate::error::{EmbeddingError, Result};


#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    pub corpus_file: String,
    pub output_dir: String,
    pub window_size: usize,
    pub dim: usize,
    pub lowercase: bool,
    pub num_threads: usize,
    pub save_counts: bool,
    pub plot: bool,
    pub pairs: Vec<(String, String)>,
    pub neighbours: Vec<String>,
    pub top_k: usize
}

impl Default for Params {
    fn default() -> Self {
        Self {
            corpus_file: String::new(),
            output_dir: String::new(),
            window_size: 1,
            dim: 5,
            lowercase: false,
            num_threads: 1,
            save_counts: false,
            plot: false,
            pairs: Vec::new(),
            neighbours: Vec::new(),
            top_k: 3
        }
    }
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using params:
        corpus_file: {}
        output_dir: {}
        window_size: {}
        dim: {}
        lowercase: {}
        num_threads: {}
        save_counts: {}
        plot: {}
        pairs: {:?}
        neighbours: {:?}
        top_k: {}",
        self.corpus_file, self.output_dir, self.window_size, self.dim, self.lowercase, self.num_threads,
        self.save_counts, self.plot, self.pairs, self.neighbours, self.top_k)
    }
}

pub struct Config {
    params: Params
}

fn config_err(msg: String) -> EmbeddingError {
    EmbeddingError::Config(msg)
}

fn required_str(json: &Value, key: &str) -> Result<String> {
    match json.get(key) {
        Some(value) => value
            .as_str()
            .map(|s| s.to_owned())
            .ok_or_else(|| config_err(format!("{} should be a string", key))),
        None => Err(config_err(format!("{} was not supplied through json", key)))
    }
}

fn optional_usize(json: &Value, key: &str, default: usize) -> Result<usize> {
    match json.get(key) {
        Some(value) => value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| config_err(format!("given {} is not a non-negative integer", key))),
        None => Ok(default)
    }
}

fn optional_bool(json: &Value, key: &str, default: bool) -> Result<bool> {
    match json.get(key) {
        Some(value) => value
            .as_bool()
            .ok_or_else(|| config_err(format!("given {} is not boolean", key))),
        None => Ok(default)
    }
}

fn optional_strings(json: &Value, key: &str) -> Result<Vec<String>> {
    match json.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(|s| s.to_owned()))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(|| config_err(format!("{} should only hold strings", key))),
        Some(_) => Err(config_err(format!("{} should be an array", key))),
        None => Ok(Vec::new())
    }
}

fn optional_pairs(json: &Value, key: &str) -> Result<Vec<(String, String)>> {
    match json.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item.as_array().map(|pair| pair.as_slice()) {
                Some([Value::String(a), Value::String(b)]) => Ok((a.to_owned(), b.to_owned())),
                _ => Err(config_err(format!("each entry of {} should be a pair of strings", key)))
            })
            .collect(),
        Some(_) => Err(config_err(format!("{} should be an array", key))),
        None => Ok(Vec::new())
    }
}

impl Config {

    pub fn get_params(&self) -> Params {
        self.params.clone()
    }

    pub fn new(args: &[String]) -> Result<Config> {

        if args.len() != 2 {
            return Err(config_err("input should be a path to json file only".to_string()));
        }

        let f = fs::File::open(&args[1])?;
        let json: Value = serde_json::from_reader(f)?;
        Config::from_json(&json)
    }

    pub fn from_json(json: &Value) -> Result<Config> {

        let defaults = Params::default();

        // validate input and output in json
        let corpus_file = required_str(json, "corpus_file")?;
        let output_dir = required_str(json, "output_dir")?;

        // handle default vs input parameters
        let params = Params {
            corpus_file,
            output_dir,
            window_size: optional_usize(json, "window_size", defaults.window_size)?,
            dim: optional_usize(json, "dim", defaults.dim)?,
            lowercase: optional_bool(json, "lowercase", defaults.lowercase)?,
            num_threads: optional_usize(json, "num_threads", defaults.num_threads)?,
            save_counts: optional_bool(json, "save_counts", defaults.save_counts)?,
            plot: optional_bool(json, "plot", defaults.plot)?,
            pairs: optional_pairs(json, "pairs")?,
            neighbours: optional_strings(json, "neighbours")?,
            top_k: optional_usize(json, "top_k", defaults.top_k)?
        };

        if params.dim == 0 {
            return Err(config_err("dim should be at least 1".to_string()));
        }
        if params.num_threads == 0 {
            return Err(config_err("num_threads should be at least 1".to_string()));
        }

        Ok(Self { params })
    }

    pub fn output_path(&self, file_name: &str) -> String {
        Path::new(&self.params.output_dir).join(file_name).display().to_string()
    }

}


pub mod files_handling {

    use ndarray::Array2;
    use ndarray_npy::write_npy;
    use std::fs::{self, File};
    use std::io::{BufRead, BufReader, BufWriter};
    use std::path::Path;

    use crate::error::Result;
    use crate::vocab::{Sentence, Vocab};

    fn parse_line(line: &str, lowercase: bool) -> Option<Sentence> {

        // line is trimmed, empty lines are dropped, tokens are whitespace separated
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let line = if lowercase { line.to_lowercase() } else { line.to_owned() };
        Some(line.split_whitespace().map(|x| x.to_string()).collect())
    }

    pub fn read_corpus(file_path: &str, lowercase: bool) -> Result<Vec<Sentence>> {

        let f = BufReader::new(File::open(file_path)?);
        let mut sequences = Vec::new();
        for line in f.lines() {
            if let Some(sentence) = parse_line(&line?, lowercase) {
                sequences.push(sentence);
            }
        }
        Ok(sequences)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: &S) -> Result<()> {

        // create output folder
        fs::create_dir_all(output_dir)?;
        item.save_file(output_dir, file_name)
    }

    pub trait SaveFile {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()>;
    }

    impl SaveFile for Array2<f64> {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = Path::new(output_dir).join(format!("{}.npy", file_name));
            write_npy(out, self)?;
            Ok(())
        }
    }

    impl SaveFile for Vocab {
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<()> {
            let out = Path::new(output_dir).join(format!("{}.json", file_name));
            let f = BufWriter::new(File::create(out)?);
            serde_json::to_writer(f, self.words())?;
            Ok(())
        }
    }

}
