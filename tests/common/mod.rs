//! Shared fixtures: a scripted MassLynx SDK and raw directory helpers.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use lcms_parser::license::{LicenseKey, LICENSE_FILE_NAME};
use lcms_parser::waters::{MassLynxReader, MassLynxSdk, SdkArrays, SdkError};

/// One MS function of the mock acquisition.
#[derive(Clone)]
pub struct MockFunction {
    pub mode: String,
    pub times: Vec<f32>,
    pub tic: Vec<f32>,
}

/// One analog channel of the mock acquisition.
#[derive(Clone)]
pub struct MockChannel {
    pub description: String,
    pub times: Vec<f32>,
    pub values: Vec<f32>,
}

/// Counters recording how often the SDK was asked for data.
#[derive(Default)]
pub struct Calls {
    pub opens: Cell<usize>,
    pub tic_reads: Cell<usize>,
    pub analog_reads: Cell<usize>,
    pub scan_reads: RefCell<Vec<(usize, usize)>>,
    pub keys: RefCell<Vec<String>>,
}

#[derive(Clone, Default)]
pub struct MockRun {
    pub functions: Vec<MockFunction>,
    pub channels: Vec<MockChannel>,
    /// Scan number that returns a shorter spectrum than the others
    pub ragged_scan: Option<usize>,
}

/// A MassLynx SDK that accepts a single license key and serves `run`.
pub struct MockSdk {
    pub accepted_key: String,
    pub run: Rc<MockRun>,
    pub calls: Rc<Calls>,
}

impl MockSdk {
    pub fn new(accepted_key: &str, run: MockRun) -> Self {
        Self {
            accepted_key: accepted_key.to_string(),
            run: Rc::new(run),
            calls: Rc::new(Calls::default()),
        }
    }
}

impl MassLynxSdk for MockSdk {
    fn open(&self, _path: &Path, key: &LicenseKey) -> Result<Box<dyn MassLynxReader>, SdkError> {
        self.calls.opens.set(self.calls.opens.get() + 1);
        self.calls.keys.borrow_mut().push(key.as_str().to_string());
        if key.as_str() != self.accepted_key {
            return Err(SdkError::LicenseRejected("invalid license key".to_string()));
        }
        Ok(Box::new(MockReader {
            run: Rc::clone(&self.run),
            calls: Rc::clone(&self.calls),
        }))
    }
}

struct MockReader {
    run: Rc<MockRun>,
    calls: Rc<Calls>,
}

impl MockReader {
    fn function(&self, function: usize) -> Result<&MockFunction, SdkError> {
        self.run.functions.get(function).ok_or(SdkError::Call {
            call: "getFunction",
            code: 3,
            message: format!("no function {}", function),
        })
    }

    fn channel(&self, channel: usize) -> Result<&MockChannel, SdkError> {
        self.run.channels.get(channel).ok_or(SdkError::Call {
            call: "readChannel",
            code: 4,
            message: format!("no channel {}", channel),
        })
    }
}

impl MassLynxReader for MockReader {
    fn function_count(&self) -> Result<usize, SdkError> {
        Ok(self.run.functions.len())
    }

    fn ion_mode(&self, function: usize) -> Result<i32, SdkError> {
        self.function(function)?;
        Ok(function as i32)
    }

    fn ion_mode_string(&self, code: i32) -> Result<String, SdkError> {
        Ok(self.function(code as usize)?.mode.clone())
    }

    fn scan_count(&self, function: usize) -> Result<usize, SdkError> {
        Ok(self.function(function)?.times.len())
    }

    fn analog_channel_count(&self) -> Result<usize, SdkError> {
        Ok(self.run.channels.len())
    }

    fn analog_channel_description(&self, channel: usize) -> Result<String, SdkError> {
        Ok(self.channel(channel)?.description.clone())
    }

    fn read_analog_channel(&self, channel: usize) -> Result<SdkArrays, SdkError> {
        self.calls.analog_reads.set(self.calls.analog_reads.get() + 1);
        let channel = self.channel(channel)?;
        Ok((channel.times.clone(), channel.values.clone()))
    }

    fn read_tic(&self, function: usize) -> Result<SdkArrays, SdkError> {
        self.calls.tic_reads.set(self.calls.tic_reads.get() + 1);
        let function = self.function(function)?;
        Ok((function.times.clone(), function.tic.clone()))
    }

    /// Scan `s` of function `f` has masses `[100 + f, 200, 300 + s]` and intensities
    /// `[s, 2s, 1]`.
    fn read_scan(&self, function: usize, scan: usize) -> Result<SdkArrays, SdkError> {
        self.calls.scan_reads.borrow_mut().push((function, scan));
        let count = self.function(function)?.times.len();
        if scan >= count {
            return Err(SdkError::Call {
                call: "readScan",
                code: 5,
                message: format!("no scan {}", scan),
            });
        }
        if self.run.ragged_scan == Some(scan) {
            return Ok((vec![100.0, 200.0], vec![1.0, 1.0]));
        }
        let s = scan as f32;
        Ok((
            vec![100.0 + function as f32, 200.0, 300.0 + s],
            vec![s, 2.0 * s, 1.0],
        ))
    }
}

/// Sum of Gaussians (sigma 0.03 min) sampled every 0.01 min from 0 to `end`.
pub fn gaussian_trace(centres: &[(f32, f32)], end: f32) -> (Vec<f32>, Vec<f32>) {
    let n = (end / 0.01).round() as usize + 1;
    let times: Vec<f32> = (0..n).map(|i| i as f32 * 0.01).collect();
    let values = times
        .iter()
        .map(|t| {
            centres
                .iter()
                .map(|(c, h)| h * (-((t - c) / 0.03).powi(2) / 2.0).exp())
                .sum()
        })
        .collect();
    (times, values)
}

/// An acquisition with ES+ (TIC peaks at 1.0 and 2.0 min), ES- and one UV channel.
pub fn sample_run() -> MockRun {
    let (times, positive) = gaussian_trace(&[(1.0, 4.0e5), (2.0, 1.2e6)], 4.0);
    let (_, negative) = gaussian_trace(&[(1.5, 2.0e5)], 4.0);
    let (uv_times, uv) = gaussian_trace(&[(1.2, 0.01), (2.4, 0.04)], 4.0);
    MockRun {
        functions: vec![
            MockFunction {
                mode: "ES+".to_string(),
                times: times.clone(),
                tic: positive,
            },
            MockFunction {
                mode: "ES-".to_string(),
                times,
                tic: negative,
            },
        ],
        channels: vec![MockChannel {
            description: "  PDA 210-400 nm \n".to_string(),
            times: uv_times,
            values: uv,
        }],
        ragged_scan: None,
    }
}

/// Create a `<name>` raw directory with a header file inside `root`.
pub fn raw_dir(root: &Path, name: &str) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("_HEADER.TXT"), "$$ Acquired Name: test\n").unwrap();
    dir
}

/// Write a `license.key` file containing `key` into `dir`.
pub fn write_license(dir: &Path, key: &str) {
    fs::write(dir.join(LICENSE_FILE_NAME), key).unwrap();
}
