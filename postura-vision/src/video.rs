use anyhow::{Context, Result};
use image::{DynamicImage, RgbImage};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, Format, FourCC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelFormat {
    Rgb3,
    Yuyv,
    Grey,
    Other(FourCC),
}

impl From<FourCC> for PixelFormat {
    fn from(fourcc: FourCC) -> Self {
        match &fourcc.repr {
            b"RGB3" => PixelFormat::Rgb3,
            b"YUYV" => PixelFormat::Yuyv,
            b"GREY" => PixelFormat::Grey,
            _ => PixelFormat::Other(fourcc),
        }
    }
}

/// V4L2 still-photo source.
pub struct Camera {
    stream: Stream<'static>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

impl Camera {
    pub fn open(device: &str) -> Result<Self> {
        let dev = Device::with_path(device).with_context(|| format!("open camera {}", device))?;
        let mut fmt = dev.format().context("get format")?;
        for fourcc in [b"RGB3", b"YUYV"] {
            let desired = Format::new(fmt.width, fmt.height, FourCC::new(fourcc));
            fmt = dev.set_format(&desired).unwrap_or(fmt);
            if fmt.fourcc == FourCC::new(fourcc) {
                break;
            }
        }
        let stream = Stream::with_buffers(&dev, Type::VideoCapture, 4).context("stream")?;
        log::info!(
            "camera {} streaming {}x{} {:?}",
            device,
            fmt.width,
            fmt.height,
            fmt.fourcc
        );
        Ok(Self {
            stream,
            width: fmt.width,
            height: fmt.height,
            format: fmt.fourcc.into(),
        })
    }

    pub fn frame(&mut self) -> Result<RgbImage> {
        let (data, meta) = self.stream.next().context("capture frame")?;
        log::debug!("captured frame seq={} len={}", meta.sequence, data.len());

        let buf = match self.format {
            PixelFormat::Rgb3 => data.to_vec(),
            PixelFormat::Yuyv => yuyv_to_rgb(self.width, self.height, data)?,
            PixelFormat::Grey => grey_to_rgb(self.width, self.height, data)?,
            PixelFormat::Other(fourcc) => {
                anyhow::bail!("unsupported camera pixel format {:?}", fourcc)
            }
        };

        let expected = (self.width * self.height * 3) as usize;
        if buf.len() < expected {
            anyhow::bail!("frame too small: got {} bytes, expected {}", buf.len(), expected);
        }
        RgbImage::from_raw(self.width, self.height, buf[..expected].to_vec())
            .context("failed to build image buffer")
    }

    /// Grab one still, dropping `warmup` frames first while exposure settles.
    pub fn snapshot(&mut self, warmup: usize) -> Result<DynamicImage> {
        for _ in 0..warmup {
            self.stream.next().context("warm-up frame")?;
        }
        Ok(DynamicImage::ImageRgb8(self.frame()?))
    }
}

fn yuyv_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height * 2) as usize;
    if data.len() < expected {
        anyhow::bail!("short YUYV buffer");
    }
    let mut out = Vec::with_capacity((width * height * 3) as usize);
    for chunk in data[..expected].chunks_exact(4) {
        let u = chunk[1] as f32 - 128.0;
        let v = chunk[3] as f32 - 128.0;
        for y in [chunk[0] as f32, chunk[2] as f32] {
            out.push(to_u8(y + 1.402 * v));
            out.push(to_u8(y - 0.344136 * u - 0.714136 * v));
            out.push(to_u8(y + 1.772 * u));
        }
    }
    Ok(out)
}

fn to_u8(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

fn grey_to_rgb(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>> {
    let expected = (width * height) as usize;
    if data.len() < expected {
        anyhow::bail!("short GREY buffer");
    }
    Ok(data[..expected].iter().flat_map(|&y| [y, y, y]).collect())
}
