//! renderer - immediate-mode drawing
//!
//! Usage in Rhai:
//! ```rhai
//! let font = renderer::load_font("/path/to/font.ttf", 14);
//! renderer::begin_frame();
//! renderer::draw_rect(0, 0, 80, 1, [40, 40, 40]);
//! renderer::draw_text(font, "hello", 1, 0, "#e0e0e0");
//! renderer::end_frame();
//! ```

use std::rc::Rc;

use rhai::{Array, Dynamic, Engine, EvalAltResult};

use super::{integer, number};
use crate::render::{Color, Font};
use crate::scripting::context::SharedContext;

/// `[r, g, b]`, `[r, g, b, a]` or a hex string
pub fn color_arg(value: &Dynamic) -> Result<Color, Box<EvalAltResult>> {
    if value.is_string() {
        let hex = value.clone().into_string()?;
        return Color::from_hex(&hex).ok_or_else(|| format!("invalid color '{hex}'").into());
    }

    let channels = value
        .clone()
        .into_array()
        .map_err(|ty| format!("expected a color array, got {ty}"))?;
    if channels.len() != 3 && channels.len() != 4 {
        return Err(format!("color needs 3 or 4 channels, got {}", channels.len()).into());
    }
    let mut rgba = [255u8; 4];
    for (slot, channel) in rgba.iter_mut().zip(&channels) {
        *slot = integer(channel)?.clamp(0, 255) as u8;
    }
    Ok(Color::rgba(rgba[0], rgba[1], rgba[2], rgba[3]))
}

fn rect_args(
    x: &Dynamic,
    y: &Dynamic,
    w: &Dynamic,
    h: &Dynamic,
) -> Result<(i64, i64, i64, i64), Box<EvalAltResult>> {
    Ok((integer(x)?, integer(y)?, integer(w)?, integer(h)?))
}

pub fn create_module(context: SharedContext) -> rhai::Module {
    let mut module = rhai::Module::new();

    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "begin_frame",
            move || -> Result<(), Box<EvalAltResult>> {
                ctx.borrow_mut()
                    .canvas
                    .begin_frame()
                    .map_err(|e| e.to_string().into())
            },
        );
    }
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn("end_frame", move || -> Result<(), Box<EvalAltResult>> {
            ctx.borrow_mut()
                .canvas
                .end_frame()
                .map_err(|e| e.to_string().into())
        });
    }

    // draw_rect(x, y, w, h, color)
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "draw_rect",
            move |x: Dynamic,
                  y: Dynamic,
                  w: Dynamic,
                  h: Dynamic,
                  color: Dynamic|
                  -> Result<(), Box<EvalAltResult>> {
                let (x, y, w, h) = rect_args(&x, &y, &w, &h)?;
                let color = color_arg(&color)?;
                ctx.borrow_mut()
                    .canvas
                    .draw_rect(x, y, w, h, color)
                    .map_err(|e| e.to_string())?;
                Ok(())
            },
        );
    }

    // draw_text(font, text, x, y, color) -> x after the text
    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "draw_text",
            move |font: Font,
                  text: &str,
                  x: Dynamic,
                  y: Dynamic,
                  color: Dynamic|
                  -> Result<i64, Box<EvalAltResult>> {
                let color = color_arg(&color)?;
                let end = ctx
                    .borrow_mut()
                    .canvas
                    .draw_text(&font, text, integer(&x)?, integer(&y)?, color)
                    .map_err(|e| e.to_string())?;
                Ok(end)
            },
        );
    }

    {
        let ctx = Rc::clone(&context);
        module.set_native_fn(
            "set_clip_rect",
            move |x: Dynamic, y: Dynamic, w: Dynamic, h: Dynamic| -> Result<(), Box<EvalAltResult>> {
                let (x, y, w, h) = rect_args(&x, &y, &w, &h)?;
                ctx.borrow_mut().canvas.set_clip_rect(x, y, w, h);
                Ok(())
            },
        );
    }

    {
        let ctx = Rc::clone(&context);
        module.set_native_fn("get_size", move || -> Result<Array, Box<EvalAltResult>> {
            let (w, h) = ctx.borrow().canvas.size();
            Ok(vec![Dynamic::from(w as i64), Dynamic::from(h as i64)])
        });
    }

    module.set_native_fn(
        "load_font",
        |path: &str, size: Dynamic| -> Result<Font, Box<EvalAltResult>> {
            Font::load(path, number(&size)?).map_err(|e| format!("{path}: {e}").into())
        },
    );

    module
}

pub fn register_types(engine: &mut Engine) {
    engine
        .register_type_with_name::<Font>("Font")
        .register_fn("copy", |font: &mut Font| font.clone())
        .register_fn(
            "copy",
            |font: &mut Font, size: Dynamic| -> Result<Font, Box<EvalAltResult>> {
                Ok(font.with_size(number(&size)?))
            },
        )
        .register_fn("get_height", |font: &mut Font| font.height())
        .register_fn("get_width", |font: &mut Font, text: &str| font.width(text))
        .register_fn("get_size", |font: &mut Font| font.size())
        .register_fn("set_tab_size", |font: &mut Font, n: i64| {
            font.set_tab_size(n.max(1) as usize)
        });
}
