//! Every pixel stream leaves in ceil(N / C) data writes, full chunks first.

mod common;

use common::{stage, MockPanel};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use st7789_lcd::St7789;

fn check_chunks(chunks: &[usize], pixels: usize, cap: usize) {
    assert_eq!(chunks.len(), pixels.div_ceil(cap));
    assert_eq!(chunks.iter().sum::<usize>(), pixels * 2);
    if let Some((last, full)) = chunks.split_last() {
        assert!(full.iter().all(|&n| n == cap * 2));
        assert!(*last > 0 && *last <= cap * 2);
    }
}

proptest::proptest! {
    /// Solid fills reuse one staged pattern.
    #[test]
    fn solid_fill_chunking(w in 1u16..=240, h in 1u16..=24, cap in 1usize..=64) {
        let mut mem = stage(cap * 2);
        let mut d = St7789::new(MockPanel::new(320), 240, 320, &mut mem).unwrap();
        d.fill_rect(0, 0, w - 1, h - 1, Rgb565::CYAN).unwrap();

        let pixels = w as usize * h as usize;
        check_chunks(&d.interface().last_stream_chunks(), pixels, cap);
        assert_eq!(d.interface().count(Rgb565::CYAN), pixels);
    }

    /// Images are restaged for every chunk.
    #[test]
    fn image_chunking(w in 1u16..=40, h in 1u16..=10, cap in 1usize..=16, odd in 0usize..=1) {
        // an odd trailing byte is never used
        let mut mem = stage(cap * 2 + odd);
        let mut d = St7789::new(MockPanel::new(320), 240, 320, &mut mem).unwrap();

        let pixels = w as usize * h as usize;
        let img: Vec<Rgb565> = (0..pixels)
            .map(|i| Rgb565::new((i % 32) as u8, (i % 64) as u8, 1))
            .collect();
        d.draw_image(0, 0, w, h, &img).unwrap();

        check_chunks(&d.interface().last_stream_chunks(), pixels, cap);
        for (i, c) in img.iter().enumerate() {
            assert_eq!(d.interface().pixel(i % w as usize, i / w as usize), *c);
        }
    }
}
