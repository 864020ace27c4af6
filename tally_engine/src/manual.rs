/*!

This is the long-form manual for `tally_engine` and `mtally`.

## Counting rules

An election has a list of candidates, a number of seats and a number of ballots.
Every ballot lists the candidates marked on it. For each seat, a voter marks one
candidate, so a complete ballot has exactly as many selections as there are seats.

### Valid and invalid ballots

Three rules may be switched on or off independently:

* `moreThanRequired`: a ballot with more selections than seats is invalid.
* `lessThanRequired`: a ballot with at least one selection but fewer than the number of
  seats is invalid.
* `blank`: a ballot without any selection is invalid.

When no rule is switched on, every ballot counts, including blank ones. Invalid ballots
do not count at all, not even for the candidates they mark correctly.

Marks for names that are not registered candidates are counted when checking the number
of selections of a ballot, but they do not give a vote to anybody.

### Percentages

Percentages are given with two decimals. They are computed relative to either:

* `totalBallots`: the number of ballots of the election, or
* `validBallots`: the number of valid ballots.

With no ballots at all, every percentage is `0.00%`.

Rounding is exact and an exact half rounds up: 23 votes out of 160 give `14.38%`.
Spreadsheets or scripts working with floating point numbers may show `14.37%` instead.

### Winners

Candidates are sorted by decreasing number of votes. Candidates with the same number of
votes keep the order in which they were registered.

* `topGroupMajority` (default): a candidate is elected if it is among the first
  candidates in this order, up to the number of seats, and has strictly more than half
  of the votes of the chosen denominator.
* `simpleMajority`: every candidate with strictly more than 50% is elected, regardless
  of the number of seats.

A candidate with exactly 50% is never elected.

## Election description

`mtally` reads an election described in JSON:

```json
{
  "outputSettings": { "contestName": "Class representatives" },
  "candidates": [{ "name": "Alice" }, { "name": "Bob" }, { "name": "Clara" }],
  "rules": {
    "seatsToElect": 2,
    "ballotCount": 40,
    "invalidBallotCriteria": { "moreThanRequired": true, "lessThanRequired": true, "blank": true },
    "calculationMode": "validBallots",
    "winnerRule": "topGroupMajority"
  },
  "ballotFileSources": [{ "provider": "csv_grid", "filePath": "ballots.csv" }]
}
```

`ballotCount` is optional and defaults to the number of ballots read. The ballots may
also be written inline with `"ballots": [["Alice", "Bob"], []]`.

`outputSettings` also accepts `contestDate`, `contestJurisdiction` and `contestOffice`,
copied into the summary, and `outputDirectory`, where a relative `--out` path is written.

## Input formats

### `csv_grid`

One row per ballot, one column per candidate, as in the sheets printed for counting.
The first row holds the candidate names. Any non-empty cell is a mark.

```text
Ballot #,Alice,Bob,Clara
Ballot 1,X,,X
Ballot 2,,X,
```

The first column is the ballot label. `firstVoteColumnIndex` (starting at 1, default 2)
controls where the candidate columns start.

### `csv_list`

One row per ballot. The cells list the names that were marked, empty cells are ignored.
`firstVoteColumnIndex` defaults to 1 and `firstVoteRowIndex` (the first row with
ballots, default 1) allows skipping a header.

```text
Alice,Clara
Bob
```

### `xlsx_grid`

The `csv_grid` layout in an Excel workbook. The worksheet is selected with
`excelWorksheetName`, otherwise the first one is used.

 */
