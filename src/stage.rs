// Staging buffer / batch transmitter.
//
// Every pixel stream leaves the driver through this buffer: it is filled with
// big-endian RGB565 pairs, then handed to the transport as one data write.
// A stream of N pixels through a buffer that holds C pixels costs ceil(N / C)
// writes; all of them carry C pixels except possibly the last.
//
// The caller must have latched the addressing window and issued RAM-write
// right before calling either flush; bytes land in window order.

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::IntoStorage;

/// Recommended staging size in bytes (10240 pixels per transport write).
pub const DEFAULT_STAGE_BYTES: usize = 20480;

/// Fixed-capacity byte buffer reused across every streaming call.
///
/// The storage is borrowed from the caller so it can be placed wherever the
/// target wants it (DMA-capable RAM, a `static`, or the stack in tests).
/// Contents are overwritten on each flush and never read back.
pub struct StagingBuffer<'buf> {
    buf: &'buf mut [u8],
}

impl<'buf> StagingBuffer<'buf> {
    /// Wrap caller storage. Returns `None` if it cannot hold a single pixel.
    ///
    /// An odd trailing byte is never used.
    pub fn new(buf: &'buf mut [u8]) -> Option<Self> {
        if buf.len() < 2 {
            return None;
        }
        Some(Self { buf })
    }

    /// Capacity in bytes (always even).
    #[inline]
    pub fn capacity_bytes(&self) -> usize {
        self.buf.len() & !1
    }

    /// Capacity in pixels; the chunk size of every flush.
    #[inline]
    pub fn capacity_pixels(&self) -> usize {
        self.buf.len() / 2
    }

    /// Stream `count` copies of `color`.
    ///
    /// The repeating pattern is written once, then the same prefix of the
    /// buffer is sent as many times as needed.
    pub fn flush_solid<DI>(
        &mut self,
        di: &mut DI,
        color: Rgb565,
        count: usize,
    ) -> Result<(), DisplayError>
    where
        DI: WriteOnlyDataCommand,
    {
        if count == 0 {
            return Ok(());
        }

        let cap = self.capacity_pixels();
        let be = color.into_storage().to_be_bytes();

        // Only as much of the pattern as the largest chunk needs
        let fill = count.min(cap);
        for px in self.buf[..fill * 2].chunks_exact_mut(2) {
            px[0] = be[0];
            px[1] = be[1];
        }

        let mut remaining = count;
        while remaining > 0 {
            let take = remaining.min(cap);
            di.send_data(DataFormat::U8(&self.buf[..take * 2]))?;
            remaining -= take;
        }
        Ok(())
    }

    /// Stream up to `count` pixels pulled lazily from `colors`.
    ///
    /// Same chunking as [`flush_solid`](Self::flush_solid), but every slot is
    /// refilled from the sequence. If the sequence runs dry early, whatever
    /// was staged is still sent and the stream ends there. Returns the number
    /// of pixels actually sent.
    pub fn flush_stream<DI, I>(
        &mut self,
        di: &mut DI,
        colors: I,
        count: usize,
    ) -> Result<usize, DisplayError>
    where
        DI: WriteOnlyDataCommand,
        I: IntoIterator<Item = Rgb565>,
    {
        let cap = self.capacity_pixels();
        let mut it = colors.into_iter();
        let mut sent = 0usize;

        while sent < count {
            let want = (count - sent).min(cap);
            let mut filled = 0usize;
            for slot in self.buf[..want * 2].chunks_exact_mut(2) {
                let Some(c) = it.next() else { break };
                slot.copy_from_slice(&c.into_storage().to_be_bytes());
                filled += 1;
            }

            if filled > 0 {
                di.send_data(DataFormat::U8(&self.buf[..filled * 2]))?;
                sent += filled;
            }
            if filled < want {
                break;
            }
        }
        Ok(sent)
    }
}
