use absa::{
    AspectSentimentEngine, AspectSource, DocumentAnnotation, DocumentParser, LexiconScorer,
    PipelineConfig,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "annotate")]
#[command(about = "Annotate parsed documents with aspect-based sentiment")]
#[command(version)]
struct Args {
    /// Input document file or directory of *.json / *.json.gz files
    #[arg(short, long)]
    input: PathBuf,

    /// Aspect taxonomy file (toml, yaml or json); the bundled taxonomy if omitted
    #[arg(short, long)]
    aspects: Option<PathBuf>,

    /// Pipeline configuration file (yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// VADER-format lexicon file (`word<TAB>valence...`); the bundled lexicon if omitted
    #[arg(short, long)]
    lexicon: Option<PathBuf>,

    /// Minimum parent span length, overrides the configuration file
    #[arg(short, long)]
    min_length: Option<usize>,

    /// Score the parent span of every token, not only keywords
    #[arg(long)]
    include_non_keywords: bool,

    /// Add an anonymized rendering of every sentence
    #[arg(long)]
    anonymize: bool,

    /// Output file for results (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One JSON object per document
    Json,
    /// Human-readable summary of the sentences that mention an aspect
    Text,
}

#[derive(Debug)]
struct AnnotateStats {
    total_files: usize,
    processed_files: usize,
    failed_files: usize,
    total_documents: usize,
    failed_documents: usize,
    total_sentences: usize,
    aspect_sentences: usize,
    total_keywords: usize,
    start_time: Instant,
}

impl Default for AnnotateStats {
    fn default() -> Self {
        Self {
            total_files: 0,
            processed_files: 0,
            failed_files: 0,
            total_documents: 0,
            failed_documents: 0,
            total_sentences: 0,
            aspect_sentences: 0,
            total_keywords: 0,
            start_time: Instant::now(),
        }
    }
}

impl AnnotateStats {
    fn record(&mut self, annotation: &DocumentAnnotation) {
        self.total_sentences += annotation.sentences.len();
        self.aspect_sentences += annotation.aspect_sentences().count();
        self.total_keywords += annotation.keyword_count();
    }

    fn print(&self) {
        let elapsed = self.start_time.elapsed();
        eprintln!("\n=== Annotation Statistics ===");
        eprintln!("Total files found: {}", self.total_files);
        eprintln!("Successfully processed: {}", self.processed_files);
        eprintln!("Failed to process: {}", self.failed_files);
        eprintln!("Documents annotated: {}", self.total_documents - self.failed_documents);
        eprintln!("Documents failed: {}", self.failed_documents);
        eprintln!("Total sentences: {}", self.total_sentences);
        eprintln!("Sentences with aspects: {}", self.aspect_sentences);
        eprintln!("Keyword occurrences: {}", self.total_keywords);
        eprintln!("Total time: {:.2?}", elapsed);
        if self.total_sentences > 0 && elapsed.as_secs_f64() > 0.0 {
            let rate = self.total_sentences as f64 / elapsed.as_secs_f64();
            eprintln!("Processing speed: {:.1} sentences/second", rate);
        }
    }
}

/// Annotates document files and writes one JSON line per document
struct DocumentAnnotator {
    engine: AspectSentimentEngine,
    parser: DocumentParser,
    stats: AnnotateStats,
    progress_bar: Option<ProgressBar>,
    format: OutputFormat,
    verbose: bool,
}

impl DocumentAnnotator {
    fn new(engine: AspectSentimentEngine, format: OutputFormat, verbose: bool) -> Self {
        Self {
            engine,
            parser: DocumentParser::new(),
            stats: AnnotateStats::default(),
            progress_bar: None,
            format,
            verbose,
        }
    }

    fn init_progress_bar(&mut self, total_files: usize) -> Result<()> {
        if !self.verbose {
            let pb = ProgressBar::new(total_files as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
                .progress_chars("#>-");
            pb.set_style(style);
            pb.set_message("Annotating documents...");
            self.progress_bar = Some(pb);
        }
        Ok(())
    }

    fn update_progress(&self, current_file: &Path) {
        let name = current_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string());
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("Processing: {}", name));
            pb.inc(1);
        } else {
            info!("Processing: {}", name);
        }
    }

    fn annotate_files(&mut self, files: &[PathBuf], out: &mut dyn Write) -> Result<()> {
        self.init_progress_bar(files.len())?;

        for file_path in files {
            self.stats.total_files += 1;
            match self.annotate_file(file_path, out) {
                Ok(()) => self.stats.processed_files += 1,
                Err(e) => {
                    self.stats.failed_files += 1;
                    error!("Failed to process {}: {:#}", file_path.display(), e);
                }
            }
            self.update_progress(file_path);
        }

        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("Annotation completed!");
        }
        out.flush()?;
        Ok(())
    }

    fn annotate_file(&mut self, file_path: &Path, out: &mut dyn Write) -> Result<()> {
        let documents = self.parser.parse_file(file_path)?;
        self.stats.total_documents += documents.len();

        for result in self.engine.annotate_documents(&documents) {
            match result {
                Ok(annotation) => {
                    self.stats.record(&annotation);
                    self.write_annotation(&annotation, out)?;
                }
                Err(_) => self.stats.failed_documents += 1,
            }
        }
        Ok(())
    }

    fn write_annotation(&self, annotation: &DocumentAnnotation, out: &mut dyn Write) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, annotation)?;
                writeln!(out)?;
            }
            OutputFormat::Text => {
                write!(out, "{}", annotation.to_formatted_string())?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}

/// The input file itself, or every *.json / *.json.gz file in the input directory
fn find_input_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        if path.is_file() && (name.ends_with(".json") || name.ends_with(".json.gz")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(min_length) = args.min_length {
        config = config.with_min_length(min_length);
    }
    if args.include_non_keywords {
        config = config.with_non_keywords(true);
    }
    if args.anonymize {
        config = config.with_anonymize(true);
    }
    Ok(config)
}

fn build_engine(args: &Args) -> Result<AspectSentimentEngine> {
    let config = build_config(args)?;
    let aspects = match &args.aspects {
        Some(path) => AspectSource::Path(path.clone()),
        None => AspectSource::default(),
    };
    let engine = match &args.lexicon {
        Some(path) => {
            let scorer = LexiconScorer::from_file(path)?;
            AspectSentimentEngine::with_scorer(aspects, config, Arc::new(scorer))?
        }
        None => AspectSentimentEngine::new(aspects, config)?,
    };
    Ok(engine)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let engine = build_engine(&args)?;

    let files = find_input_files(&args.input)?;
    info!("Found {} input files in {}", files.len(), args.input.display());

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            fs::File::create(path).with_context(|| format!("Cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut annotator = DocumentAnnotator::new(engine, args.format, args.verbose);
    annotator.annotate_files(&files, out.as_mut())?;
    annotator.stats.print();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lexicon_option_replaces_bundled_scorer() {
        let dir = TempDir::new().unwrap();
        let lexicon = dir.path().join("vader_lexicon.txt");
        fs::write(&lexicon, "splendid\t2.5\t0.5\t[2, 3, 3, 2]\n").unwrap();

        let args = Args::try_parse_from([
            "annotate",
            "--input",
            "reviews.json",
            "--lexicon",
            lexicon.to_str().unwrap(),
        ])
        .unwrap();
        let engine = build_engine(&args).unwrap();

        assert!(engine.scorer().compound("a splendid class") > 0.0);
        assert_eq!(engine.scorer().compound("a great class"), 0.0);
    }

    #[test]
    fn test_missing_lexicon_file_is_an_error() {
        let args = Args::try_parse_from([
            "annotate",
            "-i",
            "reviews.json",
            "-l",
            "/nonexistent/vader_lexicon.txt",
        ])
        .unwrap();
        assert!(build_engine(&args).is_err());
    }

    #[test]
    fn test_format_option() {
        let args = Args::try_parse_from(["annotate", "-i", "reviews.json"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);

        let args =
            Args::try_parse_from(["annotate", "-i", "reviews.json", "--format", "text"]).unwrap();
        assert_eq!(args.format, OutputFormat::Text);
        assert!(Args::try_parse_from(["annotate", "-i", "x", "--format", "xml"]).is_err());
    }
}
