/// Where a `page` command should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    Number(u32),
    Next,
    Previous,
}

/// Parse a page argument: `3`, `p3`, `next`/`n`, `prev`/`p`
pub fn parse_page_arg(arg: &str) -> Result<PageTarget, String> {
    let arg = arg.trim().to_lowercase();
    match arg.as_str() {
        "next" | "n" | ">" => return Ok(PageTarget::Next),
        "prev" | "previous" | "p" | "<" => return Ok(PageTarget::Previous),
        _ => {}
    }

    let digits = arg.strip_prefix('p').unwrap_or(&arg);
    digits
        .parse::<u32>()
        .map(PageTarget::Number)
        .map_err(|_| {
            "❌ Invalid page number. Use: `page 2`, `page p2`, `page next` or `page prev`"
                .to_string()
        })
}
