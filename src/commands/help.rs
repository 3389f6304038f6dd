pub fn help_text() -> String {
    [
        "⚡ node-dash commands",
        "",
        "  tab <all|incoming|outgoing>     switch payment category",
        "  page <n|next|prev>              go to a page (also: next, prev)",
        "  filter <key=value ...>          state=<settled|failed|pending>",
        "                                  amount>=N | amount<=N | amount=N (sats)",
        "                                  op=<gte|lte|eq> value=N",
        "                                  from=YYYY-MM-DD to=YYYY-MM-DD",
        "  clear                           remove all filters",
        "  show <payment hash>             payment details",
        "  export [file.csv]               save the visible page as CSV",
        "  refresh                         reload page and category counts",
        "  help                            this message",
        "  quit                            exit",
    ]
    .join("\n")
}
