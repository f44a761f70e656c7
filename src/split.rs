use std::{
    fs,
    io::BufReader,
    num::NonZeroU32,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use clap::Args;
use rayon::iter::{IntoParallelIterator as _, ParallelIterator as _};

use crate::{
    format::{EncodeOptions, PngCompression},
    grid::{CellRect, Grid, GridSpec},
    image_util::{self, ImgUtilError, SourceImage},
};

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Source image, PNG or JPEG. The format is detected from the file content.
    #[clap(short, long)]
    pub input: Option<PathBuf>,

    /// Output folder, created if it does not exist.
    #[clap(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Number of grid rows.
    #[clap(short, long, default_value = "1")]
    pub rows: NonZeroU32,

    /// Number of grid columns.
    #[clap(short, long, default_value = "1")]
    pub cols: NonZeroU32,

    /// Quality used when writing jpeg cells [1-100].
    #[clap(long, default_value_t = 75, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: u8,

    /// Compression level used when writing png cells.
    #[clap(long, default_value_t = PngCompression::Default)]
    pub png_compression: PngCompression,

    /// Run png cells through oxipng after encoding. Lossless, but slow.
    #[clap(long, action)]
    pub optimize: bool,

    /// Encode cells on all available cores instead of one after another.
    /// The first failing cell still aborts the run.
    #[clap(long, action, verbatim_doc_comment)]
    pub parallel: bool,
}

impl SplitArgs {
    const fn grid_spec(&self) -> GridSpec {
        GridSpec::new(self.rows, self.cols)
    }

    const fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            jpeg_quality: self.jpeg_quality,
            png_compression: self.png_compression,
            optimize: self.optimize,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("input file is required")]
    MissingInput,

    #[error("error opening image file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error reading image file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error decoding image file {}: {source}", .path.display())]
    Decode { path: PathBuf, source: ImgUtilError },

    #[error("{}: {source}", .path.display())]
    UnsupportedFormat { path: PathBuf, source: ImgUtilError },

    #[error("error creating output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error extracting {cell}: {source}")]
    Bounds { cell: CellRect, source: ImgUtilError },

    #[error("error encoding {}: {source}", .path.display())]
    Encode { path: PathBuf, source: ImgUtilError },

    #[error("error creating output file {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SplitError {
    /// Process exit code, one per failure class.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::MissingInput => 2,
            Self::Open { .. } | Self::Read { .. } | Self::CreateDir { .. } | Self::Create { .. } => {
                3
            }
            Self::Decode { .. } => 4,
            Self::Bounds { .. } => 5,
            Self::UnsupportedFormat { .. } => 6,
            Self::Encode { .. } => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSummary {
    pub width: u32,
    pub height: u32,
    pub cells: usize,
    pub elapsed: Duration,
}

pub fn split(args: &SplitArgs) -> Result<SplitSummary, SplitError> {
    let start = Instant::now();

    let input = args
        .input
        .as_deref()
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or(SplitError::MissingInput)?;

    let src = read_source(input)?;
    let (width, height) = (src.image.width(), src.image.height());
    info!("image dimensions: width={width}, height={height}");

    let grid = Grid::new(width, height, args.grid_spec());
    let (cell_width, cell_height) = grid.cell_size();
    debug!(
        "splitting {} image into {}x{} cells of {cell_width}x{cell_height}px",
        src.format, args.rows, args.cols
    );

    if cell_width == 0 || cell_height == 0 {
        warn!("grid is finer than the image, some cells will be empty");
    }

    fs::create_dir_all(&args.output).map_err(|source| SplitError::CreateDir {
        path: args.output.clone(),
        source,
    })?;

    let opts = args.encode_options();
    let emit = |cell: CellRect| write_cell(&src, cell, &args.output, &opts);

    if args.parallel {
        grid.cells()
            .collect::<Vec<_>>()
            .into_par_iter()
            .try_for_each(emit)?;
    } else {
        grid.cells().try_for_each(emit)?;
    }

    Ok(SplitSummary {
        width,
        height,
        cells: grid.len(),
        elapsed: start.elapsed(),
    })
}

fn read_source(path: &Path) -> Result<SourceImage, SplitError> {
    let file = fs::File::open(path).map_err(|source| SplitError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    image_util::decode(BufReader::new(file)).map_err(|source| match source {
        ImgUtilError::IOError(source) => SplitError::Read {
            path: path.to_path_buf(),
            source,
        },
        ImgUtilError::UnsupportedFormat(_) => SplitError::UnsupportedFormat {
            path: path.to_path_buf(),
            source,
        },
        source => SplitError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn write_cell(
    src: &SourceImage,
    cell: CellRect,
    output: &Path,
    opts: &EncodeOptions,
) -> Result<(), SplitError> {
    let path = output.join(cell.file_name(src.format.extension()));

    let pixels =
        image_util::extract(&src.image, &cell).map_err(|source| SplitError::Bounds { cell, source })?;

    let bytes = src
        .format
        .encode(&pixels, opts)
        .map_err(|source| SplitError::Encode {
            path: path.clone(),
            source,
        })?;

    if cell.is_empty() {
        warn!("{cell} has no pixels, writing an empty file");
    }

    fs::write(&path, bytes).map_err(|source| SplitError::Create {
        path: path.clone(),
        source,
    })?;

    trace!("{cell} -> {}", path.display());

    Ok(())
}
